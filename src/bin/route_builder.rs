use clap::{Args, Parser, Subcommand};
use comfy_table::Table;
use jiff::civil::{Date, Time};
use jiff::tz::TimeZone;
use tracing::{info, warn};

use waste_route_planner::api::{ApiConfig, HttpBackend};
use waste_route_planner::draft::{RouteDraft, StopKind};
use waste_route_planner::model::{Area, WasteType};
use waste_route_planner::planner::{PlannerOptions, RoutePlanner};
use waste_route_planner::request::{CRITICAL_FILL_LEVEL, RouteFilters};
use waste_route_planner::schedule::ScheduleForm;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List collection areas and their bins
    Areas,
    /// Build a route for an area, apply edits and optionally save it
    Plan(PlanArgs),
}

#[derive(Args)]
struct PlanArgs {
    /// Area id or name
    #[arg(long)]
    area: String,

    /// Minimum fill level (percent) for a bin to be collected
    #[arg(long, default_value_t = 70)]
    threshold: u8,

    /// GENERAL, ORGANIC, RECYCLE or HAZARDOUS
    #[arg(long, value_parser = parse_waste_type)]
    waste_type: Option<WasteType>,

    /// Always collect bins at 90% or above
    #[arg(long)]
    include_critical: bool,

    /// Bin ids to leave out (repeatable)
    #[arg(long)]
    exclude: Vec<String>,

    /// Bin ids to add (repeatable)
    #[arg(long)]
    include: Vec<String>,

    /// Extra stop as LAT,LNG (repeatable)
    #[arg(long, value_parser = parse_lat_lng)]
    waypoint: Vec<(String, String)>,

    #[arg(long)]
    collector: Option<String>,

    /// Collection date, defaults to today
    #[arg(long)]
    date: Option<Date>,

    #[arg(long, default_value = "08:00")]
    time: Time,

    #[arg(long, default_value = "")]
    notes: String,

    /// Save the route as a schedule
    #[arg(long)]
    save: bool,
}

fn parse_waste_type(input: &str) -> Result<WasteType, String> {
    match input.to_ascii_uppercase().as_str() {
        "GENERAL" => Ok(WasteType::General),
        "ORGANIC" => Ok(WasteType::Organic),
        "RECYCLE" => Ok(WasteType::Recycle),
        "HAZARDOUS" => Ok(WasteType::Hazardous),
        other => Err(format!("unknown waste type {}", other)),
    }
}

fn parse_lat_lng(input: &str) -> Result<(String, String), String> {
    input
        .split_once(',')
        .map(|(lat, lng)| (lat.trim().to_string(), lng.trim().to_string()))
        .ok_or_else(|| String::from("expected LAT,LNG"))
}

fn main() -> Result<(), anyhow::Error> {
    dotenvy::from_filename("./.env.local").ok();

    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(if cli.debug {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .init();

    let backend = HttpBackend::new(ApiConfig::from_env())?;
    let planner = RoutePlanner::new(backend, PlannerOptions::default());

    match cli.command {
        Commands::Areas => list_areas(&planner.areas()?),
        Commands::Plan(args) => plan(&planner, args)?,
    }

    Ok(())
}

fn list_areas(areas: &[Area]) {
    let mut table = Table::new();
    table.set_header(vec!["Id", "Name", "Bins", "Critical"]);
    for area in areas {
        let critical = area.bins.iter().filter(|bin| bin.fill_level >= CRITICAL_FILL_LEVEL).count();
        table.add_row(vec![
            area.id.clone(),
            area.name.clone(),
            area.bins.len().to_string(),
            critical.to_string(),
        ]);
    }
    println!("{table}");
}

fn plan(planner: &RoutePlanner<HttpBackend>, args: PlanArgs) -> Result<(), anyhow::Error> {
    let areas = planner.areas()?;
    let area = areas
        .iter()
        .find(|area| area.id == args.area || area.name.eq_ignore_ascii_case(&args.area));

    let time_zone = TimeZone::system();
    let date = args
        .date
        .unwrap_or_else(|| jiff::Zoned::now().with_time_zone(time_zone.clone()).date());
    let mut form = ScheduleForm::new(args.collector, date, args.time);
    form.time_zone = time_zone.clone();
    form.notes = args.notes;

    let filters = RouteFilters {
        fill_level_threshold: args.threshold,
        waste_type: args.waste_type,
        include_critical_bins: args.include_critical,
    };
    let generated = planner.generate(area, &filters, form.start()?)?;
    if let Some(reason) = &generated.fallback_reason {
        warn!("optimizer unavailable ({}); showing a synthesized route", reason);
    }

    let mut editor = generated.editor;
    for bin_id in &args.exclude {
        editor.exclude(bin_id)?;
    }
    for bin_id in &args.include {
        editor.include(bin_id)?;
    }
    for (lat, lng) in &args.waypoint {
        editor.add_waypoint(lat, lng)?;
    }

    if editor.is_adjusted() {
        if let Err(err) = planner.reoptimize(&mut editor) {
            warn!("keeping the locally adjusted route: {}", err);
        }
    }

    print_route(editor.draft(), &time_zone);

    if args.save {
        let record = planner.save(&editor, &form)?;
        info!(
            "saved schedule {}",
            record.id.as_deref().unwrap_or("(no id returned)")
        );
    }

    Ok(())
}

fn print_route(draft: &RouteDraft, time_zone: &TimeZone) {
    println!(
        "{}: {} stops, {:.1} km, {:.0} min",
        draft.area_name,
        draft.len(),
        draft.total_distance,
        draft.estimated_duration
    );
    println!("start: {}  end: {}", draft.start.label, draft.end.label);

    let mut table = Table::new();
    table.set_header(vec!["#", "Stop", "Kind", "Fill", "Waste", "ETA", "Address"]);
    for stop in &draft.stops {
        let kind = match stop.kind {
            StopKind::Bin => "bin",
            StopKind::Placeholder => "unknown",
            StopKind::Waypoint => "waypoint",
        };
        table.add_row(vec![
            stop.sequence_number.to_string(),
            stop.id.clone(),
            kind.to_string(),
            format!("{}%", stop.fill_level),
            stop.waste_type
                .map(|waste_type| format!("{:?}", waste_type))
                .unwrap_or_default(),
            stop.estimated_arrival
                .to_zoned(time_zone.clone())
                .strftime("%H:%M")
                .to_string(),
            stop.address.clone().unwrap_or_default(),
        ]);
    }
    println!("{table}");
}
