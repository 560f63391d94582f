//! `dumplist` — write the paths of the files matching a filter.

use std::io::{self, Write};

use clap::builder::{PossibleValuesParser, TypedValueParser};
use clap::{Args, Command};
use tracing::debug;

use crate::errors::Result;
use crate::params::ObjectFilter;
use crate::query::Database;

/// Protocol choices offered while no database is available.
const PLACEHOLDER_PROTOCOLS: [&str; 4] = ["waiting", "for", "database", "creation"];

#[derive(Debug, Clone, Default, Args)]
pub struct DumpListArgs {
    /// Prepended to every entry returned
    #[arg(short = 'd', long, default_value = "")]
    pub directory: String,

    /// Appended to every entry returned
    #[arg(short = 'e', long, default_value = "")]
    pub extension: String,

    /// Limits the dump to the subset of the data of this protocol
    #[arg(short = 'p', long)]
    pub protocol: Option<String>,

    /// Limits the dump to files designed for this purpose
    #[arg(short = 'u', long, value_parser = ["enrol", "probe"])]
    pub purposes: Option<String>,

    /// Limits the dump to a particular client
    #[arg(short = 'C', long)]
    pub client: Option<i64>,

    /// Limits the dump to files of this protocol group
    #[arg(short = 'g', long, value_parser = ["dev", "eval", "world"])]
    pub groups: Option<String>,

    /// Limits the dump to files of this class (client, impostor, or empty for both)
    #[arg(short = 'c', long, value_parser = parse_class)]
    pub classes: Option<String>,

    /// Runs the query but discards the output
    #[arg(long = "self-test", hide = true)]
    pub self_test: bool,
}

impl DumpListArgs {
    pub fn filter(&self) -> ObjectFilter {
        ObjectFilter::new()
            .protocol(self.protocol.as_deref())
            .purposes(self.purposes.as_deref())
            .model_ids(self.client)
            .groups(self.groups.as_deref())
            .classes(self.classes.as_deref())
    }
}

fn parse_class(value: &str) -> std::result::Result<String, String> {
    match value {
        "" | "client" | "impostor" => Ok(value.to_string()),
        other => Err(format!("'{other}' is not one of: client, impostor, ''")),
    }
}

/// Restrict `--protocol` and `--client` of the `dumplist` subcommand to the
/// values registered in `db`.
pub fn with_choices(cmd: Command, db: Option<&Database>) -> Result<Command> {
    let (protocols, clients): (Vec<String>, Vec<String>) = match db {
        Some(db) => (
            db.protocol_names()?,
            db.model_ids(&Default::default())?
                .iter()
                .map(i64::to_string)
                .collect(),
        ),
        None => (
            PLACEHOLDER_PROTOCOLS.iter().map(|s| s.to_string()).collect(),
            Vec::new(),
        ),
    };

    Ok(cmd.mut_subcommand("dumplist", |sub| {
        sub.mut_arg("protocol", |arg| {
            arg.value_parser(PossibleValuesParser::new(protocols))
        })
        .mut_arg("client", |arg| {
            arg.value_parser(
                PossibleValuesParser::new(clients).try_map(|id| id.parse::<i64>()),
            )
        })
    }))
}

/// Write one path per matching file to `out`.
pub fn dumplist(db: &Database, args: &DumpListArgs, out: &mut dyn Write) -> Result<i32> {
    let files = db.objects(&args.filter())?;
    debug!(count = files.len(), self_test = args.self_test, "dumplist");

    let prefix = Some(args.directory.as_str());
    let suffix = Some(args.extension.as_str());
    for f in &files {
        writeln!(out, "{}", f.make_path(prefix, suffix))?;
    }
    out.flush()?;
    Ok(0)
}

/// Run `dumplist` against stdout, or a sink under `--self-test`.
pub fn run(db: &Database, args: &DumpListArgs) -> Result<i32> {
    if args.self_test {
        return dumplist(db, args, &mut io::sink());
    }
    let stdout = io::stdout();
    let mut out = stdout.lock();
    dumplist(db, args, &mut out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use clap::{FromArgMatches, Parser, Subcommand};

    #[derive(Parser)]
    struct TestCli {
        #[command(subcommand)]
        command: TestCommand,
    }

    #[derive(Subcommand)]
    enum TestCommand {
        Dumplist(DumpListArgs),
    }

    fn parse(db: Option<&Database>, argv: &[&str]) -> std::result::Result<DumpListArgs, clap::Error> {
        use clap::CommandFactory;
        let cmd = with_choices(TestCli::command(), db).unwrap();
        let matches = cmd.try_get_matches_from(argv)?;
        let cli = TestCli::from_arg_matches(&matches)?;
        let TestCommand::Dumplist(args) = cli.command;
        Ok(args)
    }

    fn dump(db: &Database, args: &DumpListArgs) -> Vec<String> {
        let mut buf = Vec::new();
        assert_eq!(dumplist(db, args, &mut buf).unwrap(), 0);
        String::from_utf8(buf).unwrap().lines().map(str::to_string).collect()
    }

    #[test]
    fn test_dump_impostor_probes() {
        let db = fixtures::database();
        let args = parse(
            Some(&db),
            &[
                "t", "dumplist", "-d", "/data", "-e", ".wav", "-p", "male", "-u", "probe",
                "-g", "dev", "-c", "impostor", "-C", "1",
            ],
        )
        .unwrap();
        assert_eq!(
            dump(&db, &args),
            vec!["/data/dev/003/02_r_01_mobile.wav", "/data/dev/003/02_r_02_laptop.wav"]
        );
    }

    #[test]
    fn test_dump_defaults_list_everything() {
        let db = fixtures::database();
        let args = parse(Some(&db), &["t", "dumplist"]).unwrap();
        let lines = dump(&db, &args);
        // 7 dev/eval clients x 3 files + 4 world clients x 2 files
        assert_eq!(lines.len(), 29);
        assert_eq!(lines[0], "dev/001/01_p_01_mobile");
    }

    #[test]
    fn test_empty_classes_means_all() {
        let db = fixtures::database();
        let empty = parse(Some(&db), &["t", "dumplist", "-g", "dev", "-c", ""]).unwrap();
        let unset = parse(Some(&db), &["t", "dumplist", "-g", "dev"]).unwrap();
        assert_eq!(dump(&db, &empty), dump(&db, &unset));
    }

    #[test]
    fn test_choices_come_from_database() {
        let db = fixtures::database();
        assert!(parse(Some(&db), &["t", "dumplist", "-p", "mixed"]).is_err());
        assert!(parse(Some(&db), &["t", "dumplist", "-C", "99"]).is_err());
        assert!(parse(Some(&db), &["t", "dumplist", "-g", "train"]).is_err());
        assert!(parse(Some(&db), &["t", "dumplist", "-c", "genuine"]).is_err());
        let args = parse(Some(&db), &["t", "dumplist", "-C", "5"]).unwrap();
        assert_eq!(args.client, Some(5));
    }

    #[test]
    fn test_placeholder_choices_without_database() {
        assert!(parse(None, &["t", "dumplist", "-p", "waiting"]).is_ok());
        assert!(parse(None, &["t", "dumplist", "-p", "male"]).is_err());
        assert!(parse(None, &["t", "dumplist", "-C", "1"]).is_err());
    }

    #[test]
    fn test_self_test_writes_nothing() {
        let db = fixtures::database();
        let args = parse(Some(&db), &["t", "dumplist", "--self-test"]).unwrap();
        assert!(args.self_test);
        assert_eq!(run(&db, &args).unwrap(), 0);
    }
}
