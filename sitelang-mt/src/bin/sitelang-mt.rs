use clap::{Arg, ArgAction, Command};
use sitelang_mt::{
    GoogleTranslateProvider, MachineTranslator, MimeType, MockMode, MockTranslator,
    TranslationGateway, resolve_language_code,
};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let matches = Command::new("sitelang-mt")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Batch machine translation for sitelang catalogs")
        .arg(
            Arg::new("text")
                .help("Texts to translate; empty arguments are kept in place")
                .required(true)
                .num_args(1..)
                .index(1),
        )
        .arg(
            Arg::new("source")
                .long("source")
                .short('s')
                .help("Source language (default: en)")
                .default_value("en"),
        )
        .arg(
            Arg::new("target")
                .long("target")
                .short('t')
                .help("Target language (e.g., fr, de, zh-Hant)")
                .required(true),
        )
        .arg(
            Arg::new("mime")
                .long("mime")
                .help("text/plain or text/html")
                .default_value("text/plain"),
        )
        .arg(
            Arg::new("mock")
                .long("mock")
                .short('m')
                .help("Use mock translator instead of Google Translate")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    let texts: Vec<String> = matches
        .get_many::<String>("text")
        .into_iter()
        .flatten()
        .cloned()
        .collect();
    let source = resolve_language_code(
        matches
            .get_one::<String>("source")
            .map(String::as_str)
            .unwrap_or("en"),
    );
    let target = resolve_language_code(
        matches
            .get_one::<String>("target")
            .ok_or("Missing target language")?,
    );
    let mime_type: MimeType = matches
        .get_one::<String>("mime")
        .map(String::as_str)
        .unwrap_or_default()
        .parse()?;

    let translator: Arc<dyn MachineTranslator> = if matches.get_flag("mock") {
        Arc::new(MockTranslator::new(MockMode::Suffix))
    } else {
        match GoogleTranslateProvider::from_env() {
            Ok(provider) => Arc::new(provider),
            Err(e) => {
                eprintln!("❌ {}", e);
                eprintln!("   Set it with: export GOOGLE_TRANSLATE_API_KEY=your_api_key");
                eprintln!("   Or use --mock to use mock translator");
                return Err(e.into());
            }
        }
    };

    let gateway = TranslationGateway::new(translator);
    for line in gateway
        .translate_batch(&texts, &source, &target, mime_type)
        .await?
    {
        println!("{}", line);
    }

    Ok(())
}
