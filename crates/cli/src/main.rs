#![forbid(unsafe_code)]

mod args;

use args::{CliConfig, Command, Parsed};
use serde::Serialize;
use serde_json::{Value, json};
use sl_storage::{
    CreateRecordRequest, CreateTableRequest, ListRecordsRequest, ListStore, RecordKeyRequest,
    StoreConfig, StoreError, UpdateRecordRequest,
};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

const EXIT_OK: u8 = 0;
const EXIT_NOT_FOUND: u8 = 1;
const EXIT_FAILURE: u8 = 2;

#[derive(Serialize)]
struct ErrorBody<'a> {
    code: &'a str,
    message: String,
}

enum Outcome {
    Found(Value),
    NotFound(Value),
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("SHOPLIST_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn open_store(config: &CliConfig) -> Result<ListStore, StoreError> {
    ListStore::open(StoreConfig::new(config.db.clone()).with_busy_timeout(config.busy_timeout))
}

fn to_json(value: impl Serialize) -> Result<Value, StoreError> {
    serde_json::to_value(value).map_err(|_| StoreError::InvalidInput("response is not serializable"))
}

fn found_or_missing<T: Serialize>(value: Option<T>, what: &str) -> Result<Outcome, StoreError> {
    match value {
        Some(value) => Ok(Outcome::Found(to_json(value)?)),
        None => Ok(Outcome::NotFound(json!({
            "code": "NOT_FOUND",
            "message": format!("{what} not found"),
        }))),
    }
}

fn run(store: &ListStore, command: Command) -> Result<Outcome, StoreError> {
    match command {
        Command::CreateTable { title } => {
            let entry = store.create_table(CreateTableRequest { title })?;
            Ok(Outcome::Found(to_json(entry)?))
        }
        Command::ListTables => Ok(Outcome::Found(to_json(store.list_tables()?)?)),
        Command::DescribeTable { table } => {
            found_or_missing(store.describe_table(&table)?, "table")
        }
        Command::DropTable { table } => {
            let dropped = store.drop_table(&table)?;
            Ok(Outcome::Found(json!({ "table": table, "dropped": dropped })))
        }
        Command::Add { table, record } => {
            let record = store.create_record(CreateRecordRequest { table, record })?;
            Ok(Outcome::Found(to_json(record)?))
        }
        Command::Update { table, id, record } => found_or_missing(
            store.update_record(UpdateRecordRequest { table, id, record })?,
            "record",
        ),
        Command::Get { table, id } => {
            found_or_missing(store.get_record(RecordKeyRequest { table, id })?, "record")
        }
        Command::Delete { table, id } => {
            found_or_missing(store.delete_record(RecordKeyRequest { table, id })?, "record")
        }
        Command::List {
            table,
            offset,
            limit,
        } => {
            let records = store.list_records(ListRecordsRequest {
                table,
                offset,
                limit,
            })?;
            Ok(Outcome::Found(to_json(records)?))
        }
        Command::ListAll { table } => {
            Ok(Outcome::Found(to_json(store.list_all_records(&table)?)?))
        }
    }
}

fn print_json(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{text}"),
        Err(err) => eprintln!("failed to render output: {err}"),
    }
}

fn error_exit_code(err: &StoreError) -> u8 {
    if err.is_not_found() {
        EXIT_NOT_FOUND
    } else {
        EXIT_FAILURE
    }
}

impl Outcome {
    fn exit_code(&self) -> u8 {
        match self {
            Self::Found(_) => EXIT_OK,
            Self::NotFound(_) => EXIT_NOT_FOUND,
        }
    }

    fn body(&self) -> &Value {
        match self {
            Self::Found(value) | Self::NotFound(value) => value,
        }
    }
}

fn report_error(err: &StoreError) -> ExitCode {
    let body = ErrorBody {
        code: err.code(),
        message: err.to_string(),
    };
    match serde_json::to_string(&body) {
        Ok(text) => eprintln!("{text}"),
        Err(_) => eprintln!("{err}"),
    }
    ExitCode::from(error_exit_code(err))
}

fn main() -> ExitCode {
    let argv = std::env::args().skip(1).collect::<Vec<_>>();
    let (config, command) = match args::parse(&argv, env_var) {
        Ok(Parsed::Help) => {
            print!("{}", args::usage());
            return ExitCode::SUCCESS;
        }
        Ok(Parsed::Run { config, command }) => (config, command),
        Err(message) => {
            eprintln!("{message}\n\n{}", args::usage());
            return ExitCode::from(EXIT_FAILURE);
        }
    };

    init_tracing();
    tracing::debug!(db = %config.db, ?command, "running command");

    let store = match open_store(&config) {
        Ok(store) => store,
        Err(err) => return report_error(&err),
    };

    match run(&store, command) {
        Ok(outcome) => {
            print_json(outcome.body());
            ExitCode::from(outcome.exit_code())
        }
        Err(err) => report_error(&err),
    }
}

#[cfg(test)]
mod tests;
