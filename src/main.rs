//! VoiceLens command line entry point
//!
//! Speaks text from the command line or a file through the platform speech
//! engine, or lists the voice gallery. The playback session lives here;
//! account features (library, history) require a signed-in identity and are
//! not wired up in the CLI, so completed playbacks are dropped from history.

use log::{error, info};
use std::process;
use std::time::Duration;
use voicelens::config::Config;
use voicelens::speech::backends::create_engine;
use voicelens::speech::{PlaybackRequest, Session, SessionObserver};
use voicelens::voices::language_name;
use voicelens::Result;

/// How often the main loop drains engine events
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Parsed command line options
struct Options {
    text: Option<String>,
    file: Option<String>,
    voice: Option<String>,
    pitch: Option<f32>,
    rate: Option<f32>,
    list_voices: bool,
    debug: bool,
}

fn main() {
    let options = match parse_args() {
        Ok(options) => options,
        Err(message) => {
            eprintln!("{}", message);
            eprintln!();
            print_usage();
            process::exit(2);
        }
    };

    // Initialize logger
    if options.debug {
        // Debug mode: write to voicelens.log file
        use std::fs::OpenOptions;
        match OpenOptions::new()
            .create(true)
            .append(true)
            .open("voicelens.log")
        {
            Ok(log_file) => {
                env_logger::Builder::new()
                    .filter_level(log::LevelFilter::Debug)
                    .target(env_logger::Target::Pipe(Box::new(log_file)))
                    .init();
            }
            Err(e) => {
                eprintln!("Warning: Failed to open voicelens.log for debug logging: {}", e);
                eprintln!("Continuing without file logging...");
                env_logger::Builder::new()
                    .filter_level(log::LevelFilter::Warn)
                    .init();
            }
        }

        info!(
            "VoiceLens version {} starting (debug mode, logging to voicelens.log)",
            voicelens::VERSION
        );
    } else {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Error)
            .init();
    }

    if let Err(e) = run(options) {
        error!("Fatal error: {}", e);
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn parse_args() -> std::result::Result<Options, String> {
    let mut options = Options {
        text: None,
        file: None,
        voice: None,
        pitch: None,
        rate: None,
        list_voices: false,
        debug: false,
    };

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--help" | "-h" => {
                print_usage();
                process::exit(0);
            }
            "--debug" | "-d" => options.debug = true,
            "--list-voices" => options.list_voices = true,
            "--file" | "-f" => {
                options.file = Some(args.next().ok_or("--file requires a path")?);
            }
            "--voice" | "-v" => {
                options.voice = Some(args.next().ok_or("--voice requires a name")?);
            }
            "--pitch" => {
                let value = args.next().ok_or("--pitch requires a value")?;
                options.pitch =
                    Some(value.parse().map_err(|_| format!("Invalid pitch: {}", value))?);
            }
            "--rate" => {
                let value = args.next().ok_or("--rate requires a value")?;
                options.rate =
                    Some(value.parse().map_err(|_| format!("Invalid rate: {}", value))?);
            }
            other if other.starts_with('-') => {
                return Err(format!("Unknown option: {}", other));
            }
            text => {
                options.text = Some(match options.text.take() {
                    Some(existing) => format!("{} {}", existing, text),
                    None => text.to_string(),
                });
            }
        }
    }

    Ok(options)
}

fn print_usage() {
    println!("Usage: voicelens [OPTIONS] [TEXT]");
    println!();
    println!("Options:");
    println!("  -f, --file PATH    Read the text to speak from a file");
    println!("  -v, --voice NAME   Voice to use (see --list-voices)");
    println!("      --pitch F      Pitch multiplier, 0.5 to 2.0 (default 1.0)");
    println!("      --rate F       Rate multiplier, 0.5 to 2.0 (default 1.0)");
    println!("      --list-voices  Show one sample voice per language");
    println!("  -d, --debug        Write debug logs to voicelens.log");
    println!("  -h, --help         Show this help");
}

/// Prints session notifications to the terminal
struct CliNotifier;

impl SessionObserver for CliNotifier {
    fn speaking_started(&mut self) {
        println!("Speaking...");
    }

    fn speaking_ended(&mut self) {
        println!("Done.");
    }

    fn error(&mut self, reason: &str) {
        eprintln!("Speech error: {}", reason);
    }
}

fn run(options: Options) -> Result<()> {
    let config = Config::load()?;
    info!("Config loaded from {:?}", config.path());

    let (engine, voices) = create_engine()?;
    let mut session = Session::new(engine);
    session.update_catalog(voices);
    session.set_observer(Box::new(CliNotifier));

    if options.list_voices {
        return list_voices(&session);
    }

    // Text comes from the command line or a file
    let text = match (&options.text, &options.file) {
        (Some(text), _) => text.clone(),
        (None, Some(path)) => {
            let document = voicelens::document::load(path)?;
            println!("Loaded {} ({} characters)", document.name, document.char_count());
            document.text
        }
        (None, None) => {
            print_usage();
            return Ok(());
        }
    };

    let mut request = PlaybackRequest::new(text)?
        .with_pitch(options.pitch.unwrap_or_else(|| config.pitch()))
        .with_rate(options.rate.unwrap_or_else(|| config.rate()));

    let voice = options
        .voice
        .or_else(|| config.voice().map(str::to_string));
    if let Some(voice) = voice {
        request = request.with_voice(voice);
    }

    session.start(&request)?;

    // Event loop: drain engine events until the session returns to idle
    loop {
        session.pump();
        if !session.is_speaking() {
            break;
        }
        std::thread::sleep(POLL_INTERVAL);
    }

    Ok(())
}

fn list_voices(session: &Session) -> Result<()> {
    let catalog = session.catalog();
    if catalog.is_empty() {
        println!("No voices reported yet; the platform may still be loading them.");
        return Ok(());
    }

    println!("One sample voice per language ({} total voices):", catalog.len());
    for voice in catalog.representatives() {
        let local = if voice.is_local { " [local]" } else { "" };
        println!(
            "  {:<12} {} ({}){}",
            language_name(&voice.language_tag),
            voice.name,
            voice.language_tag,
            local
        );
    }
    Ok(())
}
