use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use nrf_config::{init_tracing, ConfigurationService, ServiceConfig};
use nrf_configctl::{parse_list_type, parse_status, read_body, CtlCommand, StateSnapshot, VERSION};
use nrf_model::{LogLevel, NfScreeningRulesListType, ScreeningRulesQuery};
use std::path::{Path, PathBuf};
use std::sync::Arc;

fn list_type_arg() -> Arg {
    Arg::new("type")
        .required(true)
        .help("Rule list type, e.g. NF_FQDN or PLMN_ID")
}

fn file_arg() -> Arg {
    Arg::new("file")
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("JSON request body")
}

fn cli() -> Command {
    Command::new("nrf-configctl")
        .version(VERSION)
        .about("Inspect and update NRF configuration held in a state snapshot")
        .subcommand_required(true)
        .arg(
            Arg::new("state")
                .long("state")
                .required(true)
                .value_parser(value_parser!(PathBuf))
                .help("State snapshot; created on the first successful write"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_parser(value_parser!(PathBuf))
                .help("Service configuration (TOML)"),
        )
        .arg(
            Arg::new("nrf-instance-id")
                .long("nrf-instance-id")
                .required_unless_present("config")
                .help("Owning NRF instance when no configuration file is given"),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .help("Initial log level, overriding the configuration"),
        )
        .arg(
            Arg::new("json-logs")
                .long("json-logs")
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON"),
        )
        .subcommand(Command::new("show-options").about("Show NRF system options"))
        .subcommand(
            Command::new("update-options")
                .about("Update NRF system options")
                .arg(file_arg()),
        )
        .subcommand(Command::new("show-eng-options").about("Show NRF engineering options"))
        .subcommand(
            Command::new("update-eng-options")
                .about("Update NRF engineering options")
                .arg(file_arg()),
        )
        .subcommand(
            Command::new("show-rule")
                .about("Show one screening rule list")
                .arg(list_type_arg()),
        )
        .subcommand(
            Command::new("list-rules")
                .about("List screening rule lists")
                .arg(Arg::new("type").long("type").help("Only this list type"))
                .arg(Arg::new("status").long("status").help("Only ENABLED or DISABLED lists")),
        )
        .subcommand(
            Command::new("replace-rule")
                .about("Replace one screening rule list")
                .arg(list_type_arg())
                .arg(file_arg()),
        )
        .subcommand(
            Command::new("patch-rule")
                .about("Apply a JSON patch to one screening rule list")
                .arg(list_type_arg())
                .arg(file_arg()),
        )
        .subcommand(
            Command::new("create-rules")
                .about("Create screening rule lists in bulk")
                .arg(file_arg()),
        )
        .subcommand(
            Command::new("profile-events")
                .about("Show NF profile events")
                .arg(Arg::new("nf-instance-id").long("nf-instance-id").help("Only events of this NF")),
        )
        .subcommand(
            Command::new("subscription-events")
                .about("Show NF subscription events")
                .arg(Arg::new("subscription-id").long("subscription-id").help("Only events of this subscription")),
        )
}

fn service_config(matches: &ArgMatches) -> Result<ServiceConfig> {
    let mut config = match matches.get_one::<PathBuf>("config") {
        Some(path) => {
            let raw = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
            ServiceConfig::from_toml_str(&raw)?
        }
        None => {
            let id = matches
                .get_one::<String>("nrf-instance-id")
                .context("--nrf-instance-id is required without --config")?;
            ServiceConfig::new(id.clone())
        }
    };
    if let Some(level) = matches.get_one::<String>("log-level") {
        let level: LogLevel = level.parse().map_err(|e: String| anyhow::anyhow!(e))?;
        config = config.with_log_level(level);
    }
    Ok(config)
}

fn body_file(args: &ArgMatches) -> Result<&Path> {
    args.get_one::<PathBuf>("file")
        .map(PathBuf::as_path)
        .context("missing request body file")
}

fn list_type(args: &ArgMatches) -> Result<NfScreeningRulesListType> {
    let raw = args.get_one::<String>("type").context("missing rule list type")?;
    parse_list_type(raw)
}

fn command(name: &str, args: &ArgMatches) -> Result<CtlCommand> {
    Ok(match name {
        "show-options" => CtlCommand::ShowOptions,
        "update-options" => CtlCommand::UpdateOptions(read_body(body_file(args)?)?),
        "show-eng-options" => CtlCommand::ShowEngOptions,
        "update-eng-options" => CtlCommand::UpdateEngOptions(read_body(body_file(args)?)?),
        "show-rule" => CtlCommand::ShowRule(list_type(args)?),
        "list-rules" => {
            let mut query = ScreeningRulesQuery::default();
            if let Some(raw) = args.get_one::<String>("type") {
                query = query.with_list_type(parse_list_type(raw)?);
            }
            if let Some(raw) = args.get_one::<String>("status") {
                query = query.with_status(parse_status(raw)?);
            }
            CtlCommand::ListRules(query)
        }
        "replace-rule" => CtlCommand::ReplaceRule(list_type(args)?, read_body(body_file(args)?)?),
        "patch-rule" => CtlCommand::PatchRule(list_type(args)?, read_body(body_file(args)?)?),
        "create-rules" => CtlCommand::CreateRules(read_body(body_file(args)?)?),
        "profile-events" => CtlCommand::ProfileEvents(args.get_one::<String>("nf-instance-id").cloned()),
        "subscription-events" => CtlCommand::SubscriptionEvents(args.get_one::<String>("subscription-id").cloned()),
        other => anyhow::bail!("unknown command '{other}'"),
    })
}

fn main() -> Result<()> {
    let matches = cli().get_matches();
    let config = service_config(&matches)?;
    let sink = Arc::new(init_tracing(config.log_level, matches.get_flag("json-logs"))?);

    let state = matches
        .get_one::<PathBuf>("state")
        .context("--state is required")?
        .clone();
    let (store, events) = StateSnapshot::load(&state)?.into_stores()?;
    let store = Arc::new(store);
    let events = Arc::new(events);
    let service = ConfigurationService::new(config, store.clone(), events.clone(), sink)?;

    let Some((name, args)) = matches.subcommand() else {
        anyhow::bail!("no command given");
    };
    let command = command(name, args)?;
    let writes = command.is_write();

    match command.run(&service) {
        Ok(body) => {
            println!("{}", serde_json::to_string_pretty(&body)?);
            if writes {
                StateSnapshot::capture(&store, &events)?.save(&state)?;
                tracing::info!("Saved state to {}", state.display());
            }
            Ok(())
        }
        Err(problem) => {
            println!("{}", serde_json::to_string_pretty(&problem)?);
            std::process::exit(1);
        }
    }
}
