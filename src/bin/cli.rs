use clap::{Parser, Subcommand};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use timetable_tool::persistence::DEFAULT_CONFIG_PATH;
use timetable_tool::{
    Cell, DayCode, Density, DocumentFormat, JsonFileStore, PeriodIndex, Session,
};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "cli", about = "Weekly timetable editor for a single teacher")]
struct Args {
    /// Path of the JSON configuration file.
    #[arg(long, env = "TIMETABLE_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Interactive shell (default).
    Shell,
    /// Print the timetable and exit.
    Show {
        #[arg(long)]
        show_empty: bool,
        #[arg(long, default_value = "standard")]
        density: Density,
    },
    /// Render a PDF into a directory and exit.
    Export {
        #[arg(long, default_value = "standard")]
        format: DocumentFormat,
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },
    /// Report whether a saved configuration exists.
    Status,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("timetable_tool=info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn print_help() {
    println!(
        "Commands:\n  help                                 Show this help\n  home                                 Show the summary\n  show [empty] [standard|compact|pocket]\n                                       Show the timetable\n  markdown [standard|compact|pocket]   Show the timetable as markdown\n  csv <path> [density]                 Export the timetable as CSV\n  pdf <standard|pocket|a4> [dir]       Render a PDF into dir (default .)\n  teacher <text...>                    Set the teacher name\n  subjects <text...>                   Set the subjects\n  institution <text...>                Set the institution\n  year <text...>                       Set the school year\n  days <MON,TUE,...>                   Set the weekdays\n  rest <DAY>                           Set the rest day\n  include-rest <true|false>            Show the rest day in outputs\n  periods <1,2,...>                    Set the active periods (max 6)\n  time <period> <HH:MM> <HH:MM>        Set a period's time range\n  times                                List period times\n  day <DAY>                            Show the cells of one day\n  cell <DAY> <period> <class> [building] [floor] [room]\n                                       Set a cell (quote values with spaces)\n  clear <DAY> <period>                 Clear a cell\n  reset                                Initialize an empty timetable\n  example                              Load example data\n  save                                 Save the configuration\n  reload                               Reload the saved configuration\n  status                               Show configuration file status\n  dump                                 Print the raw configuration JSON\n  quit|exit                            Exit"
    );
}

fn print_table(session: &Session, show_empty: bool, density: Density) {
    let view = session.table(show_empty, density);
    match view.to_text() {
        Ok(text) => println!("Format {density}\n{text}"),
        Err(e) => println!("Error: {e}"),
    }
}

fn print_home(session: &Session) {
    let summary = session.summary();
    println!("Teacher            : {}", summary.teacher);
    println!("Subjects           : {}", summary.subjects);
    println!("Institution        : {}", summary.institution);
    println!("School year        : {}", summary.school_year);
    println!("Active days        : {}", summary.active_days);
    println!("Daily periods      : {}", summary.daily_periods);
    println!("Active periods     : {}", summary.active_periods);
}

fn print_status(session: &Session) {
    let status = session.status();
    if status.saved {
        println!("Saved configuration available at {}", status.path);
    } else {
        println!("No saved configuration at {}", status.path);
    }
}

fn print_times(session: &Session) {
    let config = session.config();
    for &period in &config.active_periods {
        println!("{:<4} period: {}", period.ordinal(), config.period_time(period).label());
    }
}

fn print_day(session: &mut Session, day: DayCode) {
    let periods = session.config().active_periods.clone();
    println!("{day}");
    for period in periods {
        let cell = session.config_mut().cell_mut(day, period).clone();
        println!(
            "  {:<4} class={:<8} building={:<4} floor={:<4} room={}",
            period.ordinal(),
            cell.class_name,
            cell.building,
            cell.floor,
            cell.room
        );
    }
}

fn export_pdf(session: &Session, format: DocumentFormat, dir: &Path) -> Result<PathBuf, String> {
    let document = session.render_document(format).map_err(|e| e.to_string())?;
    let path = dir.join(&document.file_name);
    fs::write(&path, &document.bytes).map_err(|e| e.to_string())?;
    Ok(path)
}

fn export_csv(session: &Session, path: &str, density: Density) -> Result<(), String> {
    let file = File::create(path).map_err(|e| e.to_string())?;
    session
        .table(false, density)
        .write_csv(file)
        .map_err(|e| e.to_string())
}

fn parse_density(arg: Option<&str>) -> Result<Density, String> {
    arg.map(Density::from_str).unwrap_or(Ok(Density::Standard))
}

fn parse_bool(arg: &str) -> Option<bool> {
    match arg.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" => Some(true),
        "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Splits on whitespace; double quotes group words and `""` is an empty field.
fn split_fields(line: &str) -> Result<Vec<String>, String> {
    let mut fields = Vec::new();
    let mut current: Option<String> = None;
    let mut quoted = false;
    for ch in line.chars() {
        match ch {
            '"' => {
                quoted = !quoted;
                current.get_or_insert_with(String::new);
            }
            c if c.is_whitespace() && !quoted => {
                if let Some(field) = current.take() {
                    fields.push(field);
                }
            }
            c => current.get_or_insert_with(String::new).push(c),
        }
    }
    if quoted {
        return Err("unterminated quote".to_string());
    }
    fields.extend(current);
    Ok(fields)
}

fn rest_of_line<'a>(input: &'a str, cmd: &str) -> &'a str {
    input[cmd.len()..].trim()
}

fn run_shell(mut session: Session) {
    println!("Timetable Tool (CLI) - type 'help' for commands\n");
    print_status(&session);

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        line.clear();
        match stdin.read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let mut parts = input.split_whitespace();
        let cmd = parts.next().unwrap_or("");

        match cmd {
            "help" => print_help(),
            "quit" | "exit" => break,
            "home" => print_home(&session),
            "show" => {
                let mut show_empty = false;
                let mut density = Ok(Density::Standard);
                for arg in parts {
                    if arg == "empty" {
                        show_empty = true;
                    } else {
                        density = Density::from_str(arg);
                    }
                }
                match density {
                    Ok(density) => print_table(&session, show_empty, density),
                    Err(e) => println!("Error: {e}"),
                }
            }
            "markdown" => match parse_density(parts.next()) {
                Ok(density) => print!("{}", session.table(false, density).to_markdown()),
                Err(e) => println!("Error: {e}"),
            },
            "csv" => {
                let path = parts.next();
                match (path, parse_density(parts.next())) {
                    (Some(path), Ok(density)) => match export_csv(&session, path, density) {
                        Ok(()) => println!("Timetable exported to {path}"),
                        Err(e) => println!("Error: {e}"),
                    },
                    (Some(_), Err(e)) => println!("Error: {e}"),
                    (None, _) => println!("Usage: csv <path> [density]"),
                }
            }
            "pdf" => {
                let format = parts.next().map(DocumentFormat::from_str);
                let dir = PathBuf::from(parts.next().unwrap_or("."));
                match format {
                    Some(Ok(format)) => match export_pdf(&session, format, &dir) {
                        Ok(path) => println!("PDF {format} written to {}", path.display()),
                        Err(e) => println!("Error: {e}"),
                    },
                    Some(Err(e)) => println!("Error: {e}"),
                    None => println!("Usage: pdf <standard|pocket|a4> [dir]"),
                }
            }
            "teacher" | "subjects" | "institution" | "year" => {
                let text = rest_of_line(input, cmd).to_string();
                let config = session.config_mut();
                match cmd {
                    "teacher" => config.set_teacher(text),
                    "subjects" => config.set_subjects(text),
                    "institution" => config.set_institution(text),
                    _ => config.set_school_year(text),
                }
                println!("{cmd} set.");
            }
            "days" => match parts.next().map(DayCode::parse_list) {
                Some(Ok(days)) => {
                    session.config_mut().set_weekdays(days);
                    let shown: Vec<&str> =
                        session.config().weekdays.iter().map(DayCode::as_str).collect();
                    println!("Weekdays set to {}.", shown.join(","));
                }
                Some(Err(e)) => println!("Error: {e}"),
                None => println!("Usage: days <MON,TUE,...>"),
            },
            "rest" => match parts.next().map(DayCode::from_str) {
                Some(Ok(day)) => {
                    session.config_mut().set_rest_day(day);
                    println!("Rest day set to {day}.");
                }
                Some(Err(e)) => println!("Error: {e}"),
                None => println!("Usage: rest <DAY>"),
            },
            "include-rest" => match parts.next().and_then(parse_bool) {
                Some(include) => {
                    session.config_mut().set_include_rest_day(include);
                    println!("Include rest day: {include}.");
                }
                None => println!("Usage: include-rest <true|false>"),
            },
            "periods" => match parts.next().map(PeriodIndex::parse_list) {
                Some(Ok(periods)) => match session.config_mut().set_active_periods(periods) {
                    Ok(()) => {
                        println!("Active periods set.");
                        print_times(&session);
                    }
                    Err(e) => println!("Error: {e}"),
                },
                Some(Err(e)) => println!("Error: {e}"),
                None => println!("Usage: periods <1,2,...>"),
            },
            "time" => {
                let period = parts.next();
                let start = parts.next();
                let end = parts.next();
                match (period, start, end) {
                    (Some(period), Some(start), Some(end)) => {
                        let period = match PeriodIndex::from_str(period) {
                            Ok(p) => p,
                            Err(e) => {
                                println!("Error: {e}");
                                continue;
                            }
                        };
                        match session.config_mut().set_period_time_str(period, start, end) {
                            Ok(time) => println!("{} period set to {}.", period.ordinal(), time.label()),
                            Err(e) => println!("Error: {e}"),
                        }
                    }
                    _ => println!("Usage: time <period> <HH:MM> <HH:MM>"),
                }
            }
            "times" => print_times(&session),
            "day" => match parts.next().map(DayCode::from_str) {
                Some(Ok(day)) => print_day(&mut session, day),
                Some(Err(e)) => println!("Error: {e}"),
                None => println!("Usage: day <DAY>"),
            },
            "cell" | "clear" => {
                let mut fields = match split_fields(rest_of_line(input, cmd)) {
                    Ok(fields) => fields.into_iter(),
                    Err(e) => {
                        println!("Error: {e}");
                        continue;
                    }
                };
                let day = fields.next().map(|day| DayCode::from_str(&day));
                let period = fields.next().map(|period| PeriodIndex::from_str(&period));
                let (day, period) = match (day, period) {
                    (Some(Ok(day)), Some(Ok(period))) => (day, period),
                    (Some(Err(e)), _) => {
                        println!("Error: {e}");
                        continue;
                    }
                    (_, Some(Err(e))) => {
                        println!("Error: {e}");
                        continue;
                    }
                    _ => {
                        println!("Usage: cell <DAY> <period> <class> [building] [floor] [room]");
                        continue;
                    }
                };
                if cmd == "clear" {
                    session.config_mut().clear_cell(day, period);
                    println!("Cleared {day} {} period.", period.ordinal());
                } else {
                    let mut field = || fields.next().unwrap_or_default();
                    let cell = Cell {
                        class_name: field(),
                        building: field(),
                        floor: field(),
                        room: field(),
                    };
                    session.config_mut().set_cell(day, period, cell);
                    println!("Cell {day} {} period set.", period.ordinal());
                }
            }
            "reset" => {
                session.config_mut().initialize_empty_schedule();
                println!("Timetable initialized.");
            }
            "example" => {
                session.load_example();
                println!("Example data loaded.");
            }
            "save" => match session.save() {
                Ok(()) => println!("Configuration saved."),
                Err(e) => println!("Error: {e}"),
            },
            "reload" => match session.reload() {
                Ok(()) => println!("Configuration reloaded."),
                Err(e) => println!("Error: {e}"),
            },
            "status" => print_status(&session),
            "dump" => match serde_json::to_string_pretty(session.config()) {
                Ok(json) => println!("{json}"),
                Err(e) => println!("Error: {e}"),
            },
            _ => println!("Unknown command. Type 'help'."),
        }
    }
}

fn main() {
    init_tracing();
    let args = Args::parse();

    let (session, load_error) = Session::open(JsonFileStore::new(&args.config));
    if let Some(err) = load_error {
        println!("Error loading configuration: {err}. Using defaults.");
    }

    match args.command.unwrap_or(Command::Shell) {
        Command::Shell => run_shell(session),
        Command::Show {
            show_empty,
            density,
        } => print_table(&session, show_empty, density),
        Command::Export { format, out_dir } => match export_pdf(&session, format, &out_dir) {
            Ok(path) => println!("PDF {format} written to {}", path.display()),
            Err(e) => {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        },
        Command::Status => print_status(&session),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields_split_on_whitespace_and_quotes() {
        assert_eq!(
            split_fields(r#"MON 3 2E "Main B" "" A15"#).unwrap(),
            ["MON", "3", "2E", "Main B", "", "A15"]
        );
        assert_eq!(split_fields("  a   b ").unwrap(), ["a", "b"]);
        assert!(split_fields(r#"MON 3 "open"#).is_err());
    }
}
