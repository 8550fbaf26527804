use std::io::{self, BufRead, Write};
use std::path::Path;

use anyhow::{Result, anyhow};
use clap::Parser;
use dict_lookup_rust::{
    AssumePolicy, GroupBy, InferVia, LoopContext, Modes, Outcome, ParsedArgs, Resolution,
    Resolver, Settings, settings,
};

const BIN_NAME: &str = "dict-lookup-rust";

#[derive(Parser, Debug, Clone)]
#[command(
    name = "dict-lookup-rust",
    version,
    about = "Resolve shorthand word lookups into explicit requests"
)]
struct Cli {
    /// Words and language codes, in any order
    tokens: Vec<String>,

    /// Word to look up (repeatable)
    #[arg(short = 'w', long = "word")]
    words: Vec<String>,

    /// Source language
    #[arg(short = 'f', long = "from")]
    from: Option<String>,

    /// Target language (repeatable)
    #[arg(short = 't', long = "to")]
    to: Vec<String>,

    /// How to read unflagged tokens: lang, word or no
    #[arg(short = 'a', long = "assume")]
    assume: Option<AssumePolicy>,

    /// How to guess a missing source language: off, last, detect or auto
    #[arg(long = "infer-via")]
    infer_via: Option<InferVia>,

    /// Group results by lang or word
    #[arg(short = 'g', long = "group-by")]
    group_by: Option<GroupBy>,

    /// Swap the source language with the first target
    #[arg(short = 'r', long = "reverse")]
    reverse: bool,

    /// Show inflection tables
    #[arg(short = 'i', long = "inflection")]
    inflection: bool,

    /// Show definitions
    #[arg(short = 'd', long = "definition")]
    definition: bool,

    /// Use wiktionary translations
    #[arg(short = 'W', long = "wiktio")]
    wiktio: bool,

    /// Translate through an intermediate language
    #[arg(long = "indirect")]
    indirect: bool,

    /// Toggle interactive loop mode
    #[arg(short = 'l', long = "loop")]
    loop_mode: bool,

    /// Store the given languages as the new defaults instead of looking up
    #[arg(short = 'c', long = "config")]
    config: bool,

    /// Read extra settings from a local TOML file
    #[arg(short = 's', long = "read-settings")]
    read_settings: Option<String>,

    /// Print the resolved request as JSON
    #[arg(long = "json")]
    json: bool,

    /// Enable verbose logging
    #[arg(long = "verbose")]
    verbose: bool,
}

impl Cli {
    fn parsed_args(&self) -> ParsedArgs {
        ParsedArgs {
            leftover: Vec::new(),
            words: self.words.clone(),
            from_langs: self.from.iter().cloned().collect(),
            to_langs: self.to.clone(),
            assume: self.assume,
            infer_via: self.infer_via,
            group_by: self.group_by,
            reverse: self.reverse,
            modes: Modes {
                inflection: self.inflection,
                definition: self.definition,
                wiktio: self.wiktio,
                indirect: self.indirect,
            },
            loop_toggle: self.loop_mode,
            config_edit: self.config,
        }
    }

    /// Policy and mode flags from the starting invocation act as defaults
    /// for each interactive line. Per-turn actions (`-r`, `-l`, `-c`) do not carry.
    fn inherit(&mut self, start: &Cli) {
        self.assume = self.assume.or(start.assume);
        self.infer_via = self.infer_via.or(start.infer_via);
        self.group_by = self.group_by.or(start.group_by);
        self.inflection |= start.inflection;
        self.definition |= start.definition;
        self.wiktio |= start.wiktio;
        self.indirect |= start.indirect;
        self.json |= start.json;
    }
}

struct Session {
    settings: Settings,
    resolver: Resolver,
    context: LoopContext,
}

impl Session {
    fn new(settings: Settings) -> Result<Self> {
        let resolver = Resolver::new(settings.clone())?;
        Ok(Self {
            settings,
            resolver,
            context: LoopContext::default(),
        })
    }

    fn run(&mut self, cli: &Cli) -> Result<()> {
        let resolution = self
            .resolver
            .resolve(&cli.tokens, cli.parsed_args(), &self.context)?;
        let Resolution { outcome, context } = resolution;
        self.context = context;

        match outcome {
            Outcome::Lookup(request) => {
                println!(
                    "{}",
                    dict_lookup_rust::format_request(&request, cli.json)?
                );
                let mut used = vec![request.from_lang.clone()];
                used.extend(request.to_langs.iter().cloned());
                self.store_languages(&used)?;
            }
            Outcome::ConfigEdit(parsed) => {
                let mut used = parsed.from_langs.clone();
                used.extend(parsed.to_langs.iter().cloned());
                if used.is_empty() {
                    return Err(anyhow!("--config needs at least one language"));
                }
                self.store_languages(&used)?;
                println!("languages: {}", self.settings.langs.join(", "));
            }
            Outcome::LoopToggle => {}
        }
        Ok(())
    }

    fn store_languages(&mut self, used: &[String]) -> Result<()> {
        if !self.settings.promote_langs(used) {
            return Ok(());
        }
        settings::save_languages(&self.settings.langs)?;
        self.resolver = Resolver::new(self.settings.clone())?;
        Ok(())
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    dict_lookup_rust::logging::init(cli.verbose)?;

    let settings = settings::load_settings(cli.read_settings.as_deref().map(Path::new))?;
    let mut session = Session::new(settings)?;
    session.run(&cli)?;

    if session.context.active {
        run_interactive(&mut session, &cli)?;
    }
    Ok(())
}

fn run_interactive(session: &mut Session, start: &Cli) -> Result<()> {
    println!("Interactive mode. Use -l, /quit or /exit to finish.");

    let mut line = String::new();
    let stdin = io::stdin();
    let mut stdin_lock = stdin.lock();
    while session.context.active {
        line.clear();
        print!("> ");
        io::stdout().flush()?;
        if stdin_lock.read_line(&mut line)? == 0 {
            break;
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if matches!(input, "/quit" | "/exit") {
            break;
        }

        let args = std::iter::once(BIN_NAME).chain(input.split_whitespace());
        let cli = match Cli::try_parse_from(args) {
            Ok(mut cli) => {
                cli.inherit(start);
                cli
            }
            Err(err) => {
                eprintln!("{}", err);
                continue;
            }
        };
        if let Err(err) = session.run(&cli) {
            eprintln!("error: {:#}", err);
        }
    }
    Ok(())
}
