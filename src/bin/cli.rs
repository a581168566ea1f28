use std::io::{self, Write};
use std::path::Path;

use taskplan::{
    ChildSide, Plan, PlannerConfig, RegistrationResult, RegistrationSettings, dates,
    export_schedule_to_csv, load_plan_from_json, save_plan_to_json,
};

fn setup_logging() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Warn)
        .parse_default_env()
        .init();
}

fn render_text_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (ci, cell) in row.iter().enumerate() {
            if ci < widths.len() && cell.chars().count() > widths[ci] {
                widths[ci] = cell.chars().count();
            }
        }
    }

    let mut sep = String::from("+");
    for w in &widths {
        sep.push_str(&"-".repeat(*w + 2));
        sep.push('+');
    }

    let render_row = |cells: &mut dyn Iterator<Item = &str>| {
        let mut line = String::from("|");
        for (ci, cell) in cells.enumerate() {
            let pad = widths[ci].saturating_sub(cell.chars().count());
            line.push(' ');
            line.push_str(cell);
            line.push_str(&" ".repeat(pad));
            line.push_str(" |");
        }
        line
    };

    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');
    out.push_str(&render_row(&mut headers.iter().copied()));
    out.push('\n');
    out.push_str(&sep);
    out.push('\n');
    for row in rows {
        out.push_str(&render_row(&mut row.iter().map(String::as_str)));
        out.push('\n');
    }
    out.push_str(&sep);
    out.push('\n');
    out
}

fn render_plan(plan: &Plan) -> String {
    let analysis = plan.critical_path();
    let tree = plan.tree();
    let rows: Vec<Vec<String>> = tree
        .flatten()
        .into_iter()
        .map(|task| {
            vec![
                task.id.clone(),
                tree.parent_of(&task.id).unwrap_or_default().to_string(),
                task.side.map(|s| s.as_str().to_string()).unwrap_or_default(),
                task.text.clone(),
                task.effort.map(|e| e.to_string()).unwrap_or_default(),
                dates::format_date(task.start_date),
                dates::format_date(task.end_date),
                if analysis.is_critical(&task.id) { "*".into() } else { String::new() },
            ]
        })
        .collect();
    let mut out = render_text_table(
        &["id", "parent", "side", "text", "effort", "start", "end", "crit"],
        &rows,
    );
    if !plan.edges().is_empty() {
        out.push_str("Edges:\n");
        for edge in plan.edges() {
            out.push_str(&format!("  {}: {} -> {}\n", edge.id, edge.from_id, edge.to_id));
        }
    }
    out
}

fn print_help() {
    println!(
        "Commands:\n  help                                Show this help\n  show                                Show the task tree and edges\n  add <parent> <before|after|-> <text...>\n                                      Add a task under <parent>\n  delete <id>                         Delete a task, its subtree and its edges\n  move <id> <new_parent>              Move a task under another parent\n  detach <id>                         Move a task directly under the root\n  effort <id> <days|->                Set or clear effort (calendar days)\n  dates <id> <start|-> <end|->        Set start/end dates (YYYY-MM-DD)\n  side <id> <before|after|->          Set the task's side relative to its parent\n  text <id> <text...>                 Rename a task\n  link <from> <to>                    Add an explicit dependency\n  unlink <edge_id>                    Remove an explicit dependency\n  schedule [YYYY-MM-DD]               Propagate dates backward from the root\n  cpm                                 Critical path analysis\n  payload                             Show the tracker registration payload\n  result <json_path>                  Summarize a tracker registration result\n  settings show                       Show registration settings\n  settings load <json_path>           Load registration settings from JSON\n  save json <path>                    Save the plan document\n  load json <path>                    Load a plan document\n  export csv <path>                   Export the flat schedule table\n  quit|exit                           Exit"
    );
}

fn parse_side(input: &str) -> Result<Option<ChildSide>, String> {
    if input == "-" {
        return Ok(None);
    }
    ChildSide::from_str(input)
        .map(Some)
        .ok_or_else(|| format!("Invalid side '{input}' (before|after|-)"))
}

fn parse_optional_date(input: &str) -> Result<Option<chrono::NaiveDate>, String> {
    if input == "-" {
        return Ok(None);
    }
    dates::parse_date(input)
        .map(Some)
        .ok_or_else(|| format!("Invalid date '{input}' (YYYY-MM-DD)"))
}

fn rest_of_line<'a>(parts: impl Iterator<Item = &'a str>) -> String {
    parts.collect::<Vec<_>>().join(" ")
}

fn load_settings(path: &str) -> Result<RegistrationSettings, String> {
    let content = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
    serde_json::from_str(&content).map_err(|e| e.to_string())
}

fn load_result(path: &str) -> Result<RegistrationResult, String> {
    let content = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
    serde_json::from_str(&content).map_err(|e| e.to_string())
}

fn main() {
    setup_logging();

    let config = match PlannerConfig::load(None) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Config error: {e}; using defaults");
            PlannerConfig::default()
        }
    };
    let mut settings = config.registration.clone();
    let mut plan = match config.plan_path.as_deref() {
        Some(path) => match load_plan_from_json(path) {
            Ok(plan) => plan,
            Err(e) => {
                eprintln!("Could not load {}: {e}", path.display());
                Plan::default()
            }
        },
        None => Plan::default(),
    };

    println!("Task Planner (CLI) - type 'help' for commands\n");
    println!("{}", render_plan(&plan));

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
            "show" => println!("{}", render_plan(&plan)),
            "add" => {
                let parent = parts.next();
                let side = parts.next();
                let text = rest_of_line(&mut parts);
                match (parent, side) {
                    (Some(parent), Some(side)) if !text.is_empty() => {
                        let side = match parse_side(side) {
                            Ok(side) => side,
                            Err(msg) => {
                                println!("{msg}");
                                continue;
                            }
                        };
                        match plan.add_task(parent, text, side) {
                            Ok(id) => println!("Added task {id}.\n{}", render_plan(&plan)),
                            Err(e) => println!("Error: {e}"),
                        }
                    }
                    _ => println!("Usage: add <parent> <before|after|-> <text...>"),
                }
            }
            "delete" => match parts.next() {
                Some(id) => match plan.delete_task(id) {
                    Ok(removed) => println!(
                        "Deleted {} task(s).\n{}",
                        removed.len(),
                        render_plan(&plan)
                    ),
                    Err(e) => println!("Error: {e}"),
                },
                None => println!("Usage: delete <id>"),
            },
            "move" => match (parts.next(), parts.next()) {
                (Some(id), Some(parent)) => match plan.move_task(id, parent) {
                    Ok(()) => println!("Moved {id} under {parent}.\n{}", render_plan(&plan)),
                    Err(e) => println!("Error: {e}"),
                },
                _ => println!("Usage: move <id> <new_parent>"),
            },
            "detach" => match parts.next() {
                Some(id) => match plan.detach_task(id) {
                    Ok(()) => println!("Detached {id}.\n{}", render_plan(&plan)),
                    Err(e) => println!("Error: {e}"),
                },
                None => println!("Usage: detach <id>"),
            },
            "effort" => match (parts.next(), parts.next()) {
                (Some(id), Some(value)) => {
                    let effort = if value == "-" {
                        None
                    } else {
                        match value.parse::<f64>() {
                            Ok(v) if v.is_finite() && v >= 0.0 => Some(v),
                            _ => {
                                println!("Invalid effort");
                                continue;
                            }
                        }
                    };
                    match plan.update_task(id, |task| task.effort = effort) {
                        Ok(()) => println!("effort set.\n{}", render_plan(&plan)),
                        Err(e) => println!("Error: {e}"),
                    }
                }
                _ => println!("Usage: effort <id> <days|->"),
            },
            "dates" => match (parts.next(), parts.next(), parts.next()) {
                (Some(id), Some(start), Some(end)) => {
                    let parsed = parse_optional_date(start)
                        .and_then(|start| parse_optional_date(end).map(|end| (start, end)));
                    let (start, end) = match parsed {
                        Ok(pair) => pair,
                        Err(msg) => {
                            println!("{msg}");
                            continue;
                        }
                    };
                    match plan.update_task(id, |task| {
                        task.start_date = start;
                        task.end_date = end;
                    }) {
                        Ok(()) => println!("dates set.\n{}", render_plan(&plan)),
                        Err(e) => println!("Error: {e}"),
                    }
                }
                _ => println!("Usage: dates <id> <start|-> <end|->"),
            },
            "side" => match (parts.next(), parts.next()) {
                (Some(id), Some(side)) => {
                    let side = match parse_side(side) {
                        Ok(side) => side,
                        Err(msg) => {
                            println!("{msg}");
                            continue;
                        }
                    };
                    match plan.update_task(id, |task| task.side = side) {
                        Ok(()) => println!("side set.\n{}", render_plan(&plan)),
                        Err(e) => println!("Error: {e}"),
                    }
                }
                _ => println!("Usage: side <id> <before|after|->"),
            },
            "text" => {
                let id = parts.next();
                let text = rest_of_line(&mut parts);
                match id {
                    Some(id) if !text.is_empty() => {
                        match plan.update_task(id, |task| task.text = text) {
                            Ok(()) => println!("text set.\n{}", render_plan(&plan)),
                            Err(e) => println!("Error: {e}"),
                        }
                    }
                    _ => println!("Usage: text <id> <text...>"),
                }
            }
            "link" => match (parts.next(), parts.next()) {
                (Some(from), Some(to)) => match plan.add_edge(from, to) {
                    Ok(id) => println!("Added edge {id}: {from} -> {to}."),
                    Err(e) => println!("Error: {e}"),
                },
                _ => println!("Usage: link <from> <to>"),
            },
            "unlink" => match parts.next() {
                Some(id) => match plan.remove_edge(id) {
                    Ok(edge) => println!(
                        "Removed edge {}: {} -> {}.",
                        edge.id, edge.from_id, edge.to_id
                    ),
                    Err(e) => println!("Error: {e}"),
                },
                None => println!("Usage: unlink <edge_id>"),
            },
            "schedule" => {
                let today = match parts.next() {
                    Some(raw) => match dates::parse_date(raw) {
                        Some(date) => date,
                        None => {
                            println!("Invalid date (YYYY-MM-DD)");
                            continue;
                        }
                    },
                    None => dates::today(),
                };
                plan.apply_schedule(today);
                println!("Scheduled.\n{}", render_plan(&plan));
            }
            "cpm" => {
                let analysis = plan.critical_path();
                if analysis.is_empty() {
                    println!("No critical path found ({}).", analysis.to_cli_summary());
                } else {
                    println!("Critical path ({})", analysis.to_cli_summary());
                }
                let rows: Vec<Vec<String>> = plan
                    .tree()
                    .ids()
                    .into_iter()
                    .filter_map(|id| {
                        let timing = analysis.timing(&id)?;
                        Some(vec![
                            id,
                            timing.duration.to_string(),
                            timing.earliest_start.to_string(),
                            timing.earliest_finish.to_string(),
                            timing.latest_start.to_string(),
                            timing.latest_finish.to_string(),
                            timing.slack.to_string(),
                        ])
                    })
                    .collect();
                println!(
                    "{}",
                    render_text_table(&["id", "dur", "es", "ef", "ls", "lf", "slack"], &rows)
                );
            }
            "payload" => match plan.registration_payload(&settings) {
                Ok(payload) => match serde_json::to_string_pretty(&payload) {
                    Ok(json) => println!("{json}"),
                    Err(e) => println!("Error: {e}"),
                },
                Err(e) => println!("Error: {e}"),
            },
            "result" => match parts.next() {
                Some(path) => match load_result(path) {
                    Ok(result) => {
                        println!("Registration result: {}", result.to_cli_summary());
                        for failure in &result.failures {
                            println!("  failed {}: {}", failure.task_id, failure.reason);
                        }
                        for warning in &result.warnings {
                            println!("  warning {}: {}", warning.task_id, warning.reason);
                        }
                    }
                    Err(e) => println!("Error: {e}"),
                },
                None => println!("Usage: result <json_path>"),
            },
            "settings" => match (parts.next(), parts.next()) {
                (Some("show"), _) => match serde_json::to_string_pretty(&settings) {
                    Ok(json) => println!("{json}"),
                    Err(e) => println!("Error: {e}"),
                },
                (Some("load"), Some(path)) => match load_settings(path) {
                    Ok(loaded) => {
                        settings = loaded;
                        println!("Settings loaded from {path}.");
                    }
                    Err(e) => println!("Error loading settings: {e}"),
                },
                _ => println!("Usage: settings show|load <json_path>"),
            },
            "save" => match (parts.next(), parts.next()) {
                (Some("json"), Some(path)) => match save_plan_to_json(&plan, path) {
                    Ok(()) => println!("Plan saved to {path}."),
                    Err(e) => println!("Error saving plan: {e}"),
                },
                _ => println!("Usage: save json <path>"),
            },
            "load" => match (parts.next(), parts.next()) {
                (Some("json"), Some(path)) => match load_plan_from_json(path) {
                    Ok(loaded) => {
                        plan = loaded;
                        println!("Plan loaded from {path}.\n{}", render_plan(&plan));
                    }
                    Err(e) => println!("Error loading plan: {e}"),
                },
                _ => println!("Usage: load json <path>"),
            },
            "export" => match (parts.next(), parts.next()) {
                (Some("csv"), Some(path)) => {
                    let analysis = plan.critical_path();
                    match export_schedule_to_csv(&plan, &analysis, Path::new(path)) {
                        Ok(()) => println!("Schedule exported to {path}."),
                        Err(e) => println!("Error exporting schedule: {e}"),
                    }
                }
                _ => println!("Usage: export csv <path>"),
            },
            other => println!("Unknown command '{other}'. Type 'help'."),
        }
    }
}
