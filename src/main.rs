// This file is part of the product Custodesk.
// SPDX-FileCopyrightText: 2025-2026 Custodesk Authors
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use actix_multipart::form::MultipartFormConfig;
use actix_web::rt::System;
use actix_web::{App, HttpServer, middleware::Logger, web};
use log::{LevelFilter, info};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use custodesk::app_state::AppState;
use custodesk::bootstrap;
use custodesk::customers::{CustomerService, FileCustomerStore};
use custodesk::documents::DocumentStorage;
use custodesk::iam::middleware::SessionAuthMiddlewareFactory;
use custodesk::iam::service::AuthService;
use custodesk::iam::store::FilePrincipalStore;
use custodesk::web as routes;

fn main() {
    let exit_code = run();
    std::process::exit(exit_code);
}

fn run() -> i32 {
    let runtime_root = match parse_args() {
        Ok(root) => root,
        Err(error) => {
            eprintln!("Invalid command line arguments: {}", error);
            eprintln!("Use -C <root> to set the runtime directory.");
            return 1;
        }
    };

    let bootstrap = match bootstrap::bootstrap_runtime(&runtime_root) {
        Ok(result) => result,
        Err(error) => {
            eprintln!("Bootstrap error: {}", error);
            eprintln!("Application cannot start with invalid configuration.");
            return 1;
        }
    };

    match System::new().block_on(run_server(bootstrap)) {
        Ok(()) => 0,
        Err(error) => {
            eprintln!("Server failed to start: {}", error);
            1
        }
    }
}

async fn run_server(bootstrap: bootstrap::BootstrapResult) -> std::io::Result<()> {
    let config = bootstrap.config;
    let runtime_paths = bootstrap.runtime_paths;

    let log_level = match config.log_level.to_lowercase().as_str() {
        "trace" => LevelFilter::Trace,
        "debug" => LevelFilter::Debug,
        "info" => LevelFilter::Info,
        "warn" => LevelFilter::Warn,
        "error" => LevelFilter::Error,
        _ => LevelFilter::Info,
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] {}: {}",
                chrono::Utc::now().format("%Y-%m-%d %H:%M:%S%.3f UTC"),
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();

    info!("Starting Custodesk");
    info!("Runtime root: {}", runtime_paths.root.display());
    info!("Config file: {}", runtime_paths.config_file.display());
    info!("Principals file: {}", runtime_paths.principals_file.display());
    info!("Customers file: {}", runtime_paths.customers_file.display());
    info!("Document storage: {}", runtime_paths.storage_root.display());

    let principal_store = FilePrincipalStore::new(runtime_paths.principals_file.clone())
        .map_err(|err| std::io::Error::other(err.to_string()))?;
    let auth_service = AuthService::new(Arc::new(principal_store), config.password.clone())
        .map_err(|err| std::io::Error::other(err.to_string()))?;
    info!("Auth service initialized");

    let customer_store = FileCustomerStore::new(runtime_paths.customers_file.clone())
        .map_err(|err| std::io::Error::other(err.to_string()))?;
    let documents = DocumentStorage::new(runtime_paths.storage_root.clone());
    let customer_service = CustomerService::new(Arc::new(customer_store), documents)
        .map_err(|err| std::io::Error::other(err.to_string()))?;
    info!("Customer service initialized");

    let app_state = web::Data::new(AppState::new());
    let config_data = web::Data::new(config.clone());
    let auth_data = web::Data::new(auth_service);
    let customers_data = web::Data::new(customer_service);
    let upload_limit = config.upload.max_file_size_mb as usize * 1024 * 1024;

    let bind_address = config.bind_address.clone();
    let port = config.port;
    let workers = config.workers;
    info!("Listening on {}:{}", bind_address, port);

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .app_data(config_data.clone())
            .app_data(auth_data.clone())
            .app_data(customers_data.clone())
            .app_data(MultipartFormConfig::default().total_limit(upload_limit))
            .wrap(Logger::new(
                r#"%a "%r" %s %b "%{Referer}i" "%{User-Agent}i" %T"#,
            ))
            .wrap(SessionAuthMiddlewareFactory)
            .configure(routes::configure)
    })
    .workers(workers)
    .bind((bind_address, port))?
    .run()
    .await
}

fn parse_args() -> Result<PathBuf, String> {
    parse_args_from(std::env::args().skip(1))
}

fn parse_args_from<I>(args: I) -> Result<PathBuf, String>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    let mut runtime_root = PathBuf::from(".");

    while let Some(arg) = args.next() {
        if arg == "-C" {
            let value = args
                .next()
                .ok_or_else(|| "Missing value for -C".to_string())?;
            runtime_root = PathBuf::from(value);
        } else {
            return Err(format!("Unknown argument: {}", arg));
        }
    }

    make_runtime_root_absolute(runtime_root)
}

fn make_runtime_root_absolute(runtime_root: PathBuf) -> Result<PathBuf, String> {
    if runtime_root.is_absolute() {
        return Ok(runtime_root);
    }
    let current_dir = std::env::current_dir()
        .map_err(|error| format!("Failed to resolve current directory: {}", error))?;
    Ok(current_dir.join(runtime_root))
}

#[cfg(test)]
mod tests {
    use super::parse_args_from;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn parse_args_defaults_to_current_directory() {
        let root = parse_args_from(Vec::new()).expect("parse args");
        assert!(root.is_absolute());
    }

    #[test]
    fn parse_args_accepts_runtime_root() {
        let root = parse_args_from(args(&["-C", "runtime"])).expect("parse args");
        assert!(root.ends_with("runtime"));
    }

    #[test]
    fn parse_args_rejects_missing_root_value() {
        assert!(parse_args_from(args(&["-C"])).is_err());
    }

    #[test]
    fn parse_args_rejects_unknown_arguments() {
        assert!(parse_args_from(args(&["--daemon"])).is_err());
    }
}
