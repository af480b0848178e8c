#![forbid(unsafe_code)]

use sl_storage::RecordDraft;
use std::time::Duration;

pub(crate) const DEFAULT_DB: &str = "shoplist.db";
pub(crate) const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

pub(crate) fn usage() -> &'static str {
    "shoplist — dynamic shopping lists backed by SQLite\n\n\
USAGE:\n\
  shoplist [--db PATH] [--busy-timeout-ms MS] <COMMAND> [ARGS]\n\n\
COMMANDS:\n\
  create-table TITLE\n\
  list-tables\n\
  describe-table TABLE\n\
  drop-table TABLE\n\
  add TABLE NAME [--flag] [--note TEXT]\n\
  update TABLE ID NAME [--flag] [--note TEXT]\n\
  get TABLE ID\n\
  delete TABLE ID\n\
  list TABLE [--offset N] [--limit N]\n\
  list-all TABLE\n\n\
ENVIRONMENT:\n\
  SHOPLIST_DB                database path or file: URI (default ./shoplist.db)\n\
  SHOPLIST_BUSY_TIMEOUT_MS   lock wait in milliseconds (default 5000)\n\
  SHOPLIST_LOG               tracing filter (default warn)\n"
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) struct CliConfig {
    pub(crate) db: String,
    pub(crate) busy_timeout: Duration,
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Command {
    CreateTable { title: String },
    ListTables,
    DescribeTable { table: String },
    DropTable { table: String },
    Add { table: String, record: RecordDraft },
    Update { table: String, id: i64, record: RecordDraft },
    Get { table: String, id: i64 },
    Delete { table: String, id: i64 },
    List { table: String, offset: Option<usize>, limit: Option<usize> },
    ListAll { table: String },
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Parsed {
    Help,
    Run { config: CliConfig, command: Command },
}

#[derive(Default)]
struct Options {
    positional: Vec<String>,
    flag: bool,
    note: Option<String>,
    offset: Option<usize>,
    limit: Option<usize>,
}

/// Parses `args` (without argv[0]). `env` resolves environment defaults so
/// tests can supply their own.
pub(crate) fn parse(
    args: &[String],
    env: impl Fn(&str) -> Option<String>,
) -> Result<Parsed, String> {
    let mut db = env("SHOPLIST_DB").unwrap_or_else(|| DEFAULT_DB.to_string());
    let mut busy_timeout_ms = match env("SHOPLIST_BUSY_TIMEOUT_MS") {
        Some(raw) => parse_number::<u64>(&raw, "SHOPLIST_BUSY_TIMEOUT_MS")?,
        None => DEFAULT_BUSY_TIMEOUT_MS,
    };

    let mut options = Options::default();
    let mut i = 0usize;
    while i < args.len() {
        let a = args[i].as_str();
        match a {
            "-h" | "--help" => return Ok(Parsed::Help),
            "--db" => {
                i += 1;
                db = args.get(i).ok_or("--db requires PATH")?.to_string();
            }
            "--busy-timeout-ms" => {
                i += 1;
                let v = args.get(i).ok_or("--busy-timeout-ms requires MS")?;
                busy_timeout_ms = parse_number(v, "--busy-timeout-ms")?;
            }
            "--flag" => options.flag = true,
            "--note" => {
                i += 1;
                options.note = Some(args.get(i).ok_or("--note requires TEXT")?.to_string());
            }
            "--offset" => {
                i += 1;
                let v = args.get(i).ok_or("--offset requires N")?;
                options.offset = Some(parse_number(v, "--offset")?);
            }
            "--limit" => {
                i += 1;
                let v = args.get(i).ok_or("--limit requires N")?;
                options.limit = Some(parse_number(v, "--limit")?);
            }
            other if other.starts_with("--") => return Err(format!("unknown option {other}")),
            other => options.positional.push(other.to_string()),
        }
        i += 1;
    }

    let command = build_command(options)?;
    Ok(Parsed::Run {
        config: CliConfig {
            db,
            busy_timeout: Duration::from_millis(busy_timeout_ms),
        },
        command,
    })
}

fn build_command(options: Options) -> Result<Command, String> {
    let Options {
        positional,
        flag,
        note,
        offset,
        limit,
    } = options;
    let Some((name, rest)) = positional.split_first() else {
        return Err("missing command".to_string());
    };

    let command = match (name.as_str(), rest) {
        ("create-table", [title]) => Command::CreateTable {
            title: title.clone(),
        },
        ("list-tables", []) => Command::ListTables,
        ("describe-table", [table]) => Command::DescribeTable {
            table: table.clone(),
        },
        ("drop-table", [table]) => Command::DropTable {
            table: table.clone(),
        },
        ("add", [table, name]) => Command::Add {
            table: table.clone(),
            record: RecordDraft::new(name.clone(), flag, note),
        },
        ("update", [table, id, name]) => Command::Update {
            table: table.clone(),
            id: parse_number(id, "ID")?,
            record: RecordDraft::new(name.clone(), flag, note),
        },
        ("get", [table, id]) => Command::Get {
            table: table.clone(),
            id: parse_number(id, "ID")?,
        },
        ("delete", [table, id]) => Command::Delete {
            table: table.clone(),
            id: parse_number(id, "ID")?,
        },
        ("list", [table]) => Command::List {
            table: table.clone(),
            offset,
            limit,
        },
        ("list-all", [table]) => Command::ListAll {
            table: table.clone(),
        },
        (
            "create-table" | "list-tables" | "describe-table" | "drop-table" | "add" | "update"
            | "get" | "delete" | "list" | "list-all",
            _,
        ) => return Err(format!("wrong number of arguments for {name}")),
        (other, _) => return Err(format!("unknown command {other}")),
    };
    Ok(command)
}

fn parse_number<T: std::str::FromStr>(raw: &str, what: &str) -> Result<T, String> {
    raw.trim()
        .parse::<T>()
        .map_err(|_| format!("{what} must be a number, got {raw:?}"))
}
