//! The persona server binary.
//!
//! Run with:
//!   cargo run
//!
//! Try:
//!   curl http://localhost:3000/
//!   curl 'http://localhost:3000/person/detail?name=Ana&age=31'
//!   curl http://localhost:3000/person/detail/3
//!   curl -X POST http://localhost:3000/person/new \
//!        -H 'content-type: application/json' \
//!        -d '{"first_name":"Ana","last_name":"Gómez","age":31,
//!             "email":"ana@example.com","password":"correct-horse"}'
//!   curl -X POST http://localhost:3000/login -d 'username=ana&password=x'
//!   curl -X POST http://localhost:3000/post-image -F image=@cat.jpg

use std::process::ExitCode;

use persona::{Config, Server, api, logging};
use tracing::error;

#[tokio::main]
async fn main() -> ExitCode {
    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("persona: {e}");
            return ExitCode::FAILURE;
        }
    };
    logging::init(&config.logging);

    let result = match config.socket_addr() {
        Ok(addr) => Server::bind(addr).serve(api::app(&config)).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("server error: {e}");
            ExitCode::FAILURE
        }
    }
}
