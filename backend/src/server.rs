use std::net::TcpListener;

use actix_web::dev::Server;
use actix_web::middleware::Logger;
use actix_web::{App, HttpServer, web};

use crate::pipeline::StockService;
use crate::routes;
use crate::routes::stock_prices::ClientAddrPolicy;

pub fn run(
    listener: TcpListener,
    service: StockService,
    policy: ClientAddrPolicy,
) -> std::io::Result<Server> {
    let service = web::Data::new(service);
    let policy = web::Data::new(policy);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(service.clone())
            .app_data(policy.clone())
            .service(routes::health::handler)
            .service(routes::stock_prices::handler)
    })
    .listen(listener)?
    .run();

    Ok(server)
}
