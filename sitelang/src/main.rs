use clap::{Arg, ArgAction, ArgMatches, Command};
use sitelang::{
    CatalogConfig, CatalogError, CatalogStore, Format, LanguageMap, Page, ResolveOptions,
    SiteDirectory, TranslationQuery, export_catalog, import_catalog, reconcile,
};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let matches = cli().get_matches();

    let config_path = CatalogConfig::resolve_path(
        matches.get_one::<String>("config").map(Path::new),
    );
    let config = CatalogConfig::load(&config_path)?;
    let directory = config.site_directory()?;
    let mut store = CatalogStore::open(&config.database)?;

    match matches.subcommand() {
        Some(("export", sub)) => {
            let format = format_arg(sub)?;
            let output = sub
                .get_one::<String>("output")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(format.file_name()));
            let bytes = export_catalog(&store, &directory.list_sites(), format)?;
            fs::write(&output, bytes)?;
            println!("Exported catalog to {}", output.display());
        }
        Some(("import", sub)) => {
            let format = format_arg(sub)?;
            let file = required(sub, "file")?;
            let bytes = fs::read(file)?;
            let count = import_catalog(&mut store, &directory.list_sites(), format, &bytes)?;
            println!("Imported {} translations", count);
        }
        Some(("list", sub)) => {
            let mut query = TranslationQuery::new();
            if let Some(search) = sub.get_one::<String>("search") {
                query = query.search(search);
            }
            if let Some(group) = sub.get_one::<String>("group") {
                query = query.group(group);
            }
            let total = store.count(&query)?;
            let page = Page::new(
                *sub.get_one::<usize>("page").unwrap_or(&1),
                *sub.get_one::<usize>("per-page").unwrap_or(&50),
                total,
            );
            let map = LanguageMap::from_sites(&directory.list_sites());
            let translations = store.list(&page.apply(query))?;
            for item in reconcile::collapse_all(&translations, &map) {
                let group = item.group.as_deref().unwrap_or(sitelang::DEFAULT_GROUP);
                println!("[{}] {} ({})", item.id.unwrap_or_default(), item.key, group);
                for (language, value) in &item.values {
                    println!("    {}: {}", language, value);
                }
            }
            println!(
                "Page {} of {} ({} translations)",
                page.page, page.total_pages, page.total
            );
        }
        Some(("groups", _)) => {
            for group in store.groups()? {
                println!("{}", group);
            }
        }
        Some(("resolve", sub)) => {
            let key = required(sub, "key")?;
            let primary = directory.primary_site();
            let site_id = match sub.get_one::<i64>("site") {
                Some(id) => directory
                    .site_by_id(*id)
                    .ok_or_else(|| CatalogError::Validation(format!("Unknown site {}", id)))?
                    .id,
                None => primary.id,
            };

            let mut options = ResolveOptions::default();
            if sub.get_flag("no-fallback") {
                options = options.without_fallback();
            }
            if sub.get_flag("no-create") {
                options = options.without_create();
            }
            let params = parse_params(sub)?;

            let mut resolver = store.resolver(primary.id);
            println!("{}", resolver.resolve(key, site_id, &params, options)?);
        }
        Some(("delete", sub)) => {
            let id = *sub
                .get_one::<i64>("id")
                .ok_or_else(|| CatalogError::Validation("Missing translation id".to_string()))?;
            if store.delete_by_id(id)? {
                println!("Deleted translation {}", id);
            } else {
                println!("No translation with id {}", id);
            }
        }
        _ => unreachable!("subcommand is required"),
    }

    Ok(())
}

fn cli() -> Command {
    let format = Arg::new("format")
        .long("format")
        .short('f')
        .help("Interchange format: csv, json or zip")
        .default_value("csv");

    Command::new("sitelang")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Manage a multi-site translation catalog")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .global(true)
                .help("Configuration file (default: $SITELANG_CONFIG or sitelang.json)"),
        )
        .subcommand(
            Command::new("export")
                .about("Export the catalog, one value per language")
                .arg(format.clone())
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .help("Output file (default depends on format)"),
                ),
        )
        .subcommand(
            Command::new("import")
                .about("Import translations from a file")
                .arg(
                    Arg::new("file")
                        .help("File to import")
                        .required(true)
                        .index(1),
                )
                .arg(format),
        )
        .subcommand(
            Command::new("list")
                .about("List translations")
                .arg(Arg::new("search").long("search").short('s').help("Substring of key or description"))
                .arg(Arg::new("group").long("group").short('g').help("Only this group"))
                .arg(
                    Arg::new("page")
                        .long("page")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("1"),
                )
                .arg(
                    Arg::new("per-page")
                        .long("per-page")
                        .help("Page size: 50, 100 or 250")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("50"),
                ),
        )
        .subcommand(Command::new("groups").about("List distinct groups"))
        .subcommand(
            Command::new("resolve")
                .about("Resolve a key for a site")
                .arg(
                    Arg::new("key")
                        .help("Translation key")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("site")
                        .long("site")
                        .help("Site id (default: primary site)")
                        .value_parser(clap::value_parser!(i64)),
                )
                .arg(
                    Arg::new("no-fallback")
                        .long("no-fallback")
                        .help("Do not fall back to the primary site")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("no-create")
                        .long("no-create")
                        .help("Do not register a missing key")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("param")
                        .long("param")
                        .short('p')
                        .help("Placeholder value as name=value")
                        .action(ArgAction::Append),
                ),
        )
        .subcommand(
            Command::new("delete").about("Delete a translation by id").arg(
                Arg::new("id")
                    .required(true)
                    .index(1)
                    .value_parser(clap::value_parser!(i64)),
            ),
        )
}

fn required<'a>(matches: &'a ArgMatches, name: &str) -> Result<&'a str, CatalogError> {
    matches
        .get_one::<String>(name)
        .map(String::as_str)
        .ok_or_else(|| CatalogError::Validation(format!("Missing argument '{}'", name)))
}

fn format_arg(matches: &ArgMatches) -> Result<Format, CatalogError> {
    required(matches, "format")?.parse()
}

fn parse_params(matches: &ArgMatches) -> Result<HashMap<String, String>, CatalogError> {
    let mut params = HashMap::new();
    for raw in matches.get_many::<String>("param").into_iter().flatten() {
        let (name, value) = raw.split_once('=').ok_or_else(|| {
            CatalogError::Validation(format!("Parameter '{}' is not name=value", raw))
        })?;
        params.insert(name.to_string(), value.to_string());
    }
    Ok(params)
}
