use anyhow::{Context, Result};
use clap::Parser;
use fieldquery::fields::{parse_fields, CatalogConfig};
use fieldquery::{
    CompilerSettings, DefaultOperator, FieldCatalog, NeverFinds, QueryCompiler, StaticCatalog,
};
use fieldquery::query::NgramRegexAccelerator;
use std::io::BufRead;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "fieldquery")]
#[command(about = "Compile Lucene-style query strings into field-aware query trees", long_about = None)]
struct Args {
    /// Query to compile; reads one query per line from stdin when omitted
    query: Option<String>,

    /// JSON file with compiler settings
    #[arg(long, env = "FIELDQUERY_SETTINGS")]
    settings: Option<PathBuf>,

    /// JSON file describing the mapped fields and their analyzers
    #[arg(long, env = "FIELDQUERY_MAPPING")]
    mapping: Option<PathBuf>,

    /// Default search fields, e.g. "title^2, text"
    #[arg(long, env = "FIELDQUERY_FIELDS")]
    fields: Option<String>,

    /// Join unmarked clauses with OR instead of AND
    #[arg(long)]
    default_or: bool,

    /// Empty queries match nothing instead of everything
    #[arg(long)]
    empty_match_none: bool,

    /// Extra fields users may name explicitly
    #[arg(long, value_delimiter = ',')]
    whitelist: Vec<String>,

    /// Fields users may never search
    #[arg(long, value_delimiter = ',')]
    blacklist: Vec<String>,

    /// Field alias as name=fields, e.g. "tc=title^2,category"
    #[arg(long)]
    alias: Vec<String>,

    /// Allow wildcards at the start of a term
    #[arg(long)]
    allow_leading_wildcard: bool,

    /// Compile /pattern/ as a regex query
    #[arg(long)]
    regex: bool,

    /// Print the parse tree instead of the compiled query
    #[arg(long)]
    parse_tree: bool,
}

impl Args {
    fn compiler_settings(&self) -> Result<CompilerSettings> {
        let mut settings = match &self.settings {
            Some(path) => CompilerSettings::from_json_file(path)
                .with_context(|| format!("loading settings from {}", path.display()))?,
            None => CompilerSettings::default(),
        };

        if let Some(fields) = &self.fields {
            settings.fields = fields.clone();
        }
        if self.default_or {
            settings.default_operator = DefaultOperator::Or;
        }
        if self.empty_match_none {
            settings.empty_is_match_all = false;
        }
        if self.allow_leading_wildcard {
            settings.field_query.allow_leading_wildcard = true;
        }

        let mut authorization = settings.authorization.clone();
        for field in &self.whitelist {
            authorization = authorization.whitelist(field.trim());
        }
        for field in &self.blacklist {
            authorization = authorization.blacklist(field.trim());
        }
        for alias in &self.alias {
            let (name, fields) = alias
                .split_once('=')
                .with_context(|| format!("alias '{}' must look like name=fields", alias))?;
            parse_fields(fields).with_context(|| format!("bad alias '{}'", alias))?;
            authorization = authorization.alias(name.trim(), fields);
        }
        settings.authorization = authorization;

        Ok(settings)
    }

    fn catalog(&self) -> Result<Arc<dyn FieldCatalog>> {
        match &self.mapping {
            Some(path) => {
                let config = CatalogConfig::from_json_file(path)
                    .with_context(|| format!("loading mapping from {}", path.display()))?;
                let catalog = StaticCatalog::from_config(&config);
                info!("Loaded {} mapped fields", catalog.len());
                Ok(Arc::new(catalog))
            }
            None => {
                warn!("No mapping given, every field uses the default analyzers");
                Ok(Arc::new(NeverFinds::default()))
            }
        }
    }
}

fn main() -> Result<()> {
    // Logs go to stderr so stdout stays valid JSON
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let args = Args::parse();
    info!("Starting fieldquery v{}", fieldquery::VERSION);

    let settings = args.compiler_settings()?;
    let mut compiler = QueryCompiler::new(settings, args.catalog()?).map_err(|err| {
        if err.is_user_error() {
            anyhow::anyhow!("invalid settings: {}", err)
        } else {
            anyhow::Error::new(err).context("building query compiler")
        }
    })?;
    if args.regex {
        compiler = compiler.with_regex_accelerator(Arc::new(NgramRegexAccelerator::new()));
    }

    match &args.query {
        Some(query) => print_query(&compiler, query, args.parse_tree)?,
        None => {
            for line in std::io::stdin().lock().lines() {
                print_query(&compiler, &line?, args.parse_tree)?;
            }
        }
    }

    Ok(())
}

fn print_query(compiler: &QueryCompiler, query: &str, parse_tree: bool) -> Result<()> {
    let json = if parse_tree {
        serde_json::to_string(&compiler.parse(query))?
    } else {
        serde_json::to_string(&compiler.compile(query)?)?
    };
    println!("{}", json);
    Ok(())
}
