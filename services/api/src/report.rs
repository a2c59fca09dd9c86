use clap::Args;
use observation_report::config::{AppConfig, RoleDirectory};
use observation_report::error::AppError;
use observation_report::observations::report::{
    AreaBreakdown, ClassificationShare, ObservationDetail, ObservationReport, ReportStatus,
    TeacherDetail,
};
use observation_report::observations::{ObservationDataset, ObservationFilter, RoleScope};
use observation_report::sources::{CsvDirectorySource, Table};
use observation_report::telemetry;
use serde::Serialize;
use std::fmt::Write;
use std::path::PathBuf;

#[derive(Args, Debug, Default, Clone)]
pub(crate) struct SourceArgs {
    /// Directory holding the CSV sources (overrides OBS_DATA_DIR)
    #[arg(long)]
    pub(crate) data_dir: Option<PathBuf>,
    /// Observation source identifier, e.g. a file stem in the data directory
    #[arg(long)]
    pub(crate) observations: Option<String>,
    /// Cutoff calendar source identifier
    #[arg(long)]
    pub(crate) cutoffs: Option<String>,
    /// Program catalog source identifier
    #[arg(long)]
    pub(crate) catalog: Option<String>,
    /// Skip the program catalog and keep service names as typed
    #[arg(long, conflicts_with = "catalog")]
    pub(crate) no_catalog: bool,
    /// Role to program pins (`role=program_id,...`), replacing OBS_ROLE_PROGRAMS
    #[arg(long, value_parser = crate::infra::parse_role_mapping)]
    pub(crate) role_programs: Option<RoleDirectory>,
}

#[derive(Args, Debug, Default, Clone)]
pub(crate) struct FilterArgs {
    /// Only observations tagged with this period label
    #[arg(long)]
    pub(crate) period: Option<String>,
    /// Only observations of this resolved program id
    #[arg(long)]
    pub(crate) program: Option<String>,
    /// Only observations of this type
    #[arg(long)]
    pub(crate) observation_type: Option<String>,
    /// Caller role; a pinned role overrides --program
    #[arg(long)]
    pub(crate) role: Option<String>,
}

impl FilterArgs {
    fn filter(&self) -> ObservationFilter {
        ObservationFilter {
            period: self.period.clone(),
            program: self.program.clone(),
            observation_type: self.observation_type.clone(),
        }
    }
}

#[derive(Args, Debug)]
pub(crate) struct ReportArgs {
    #[command(flatten)]
    pub(crate) sources: SourceArgs,
    #[command(flatten)]
    pub(crate) filters: FilterArgs,
    /// Number of observation rows to list (0 hides the listing)
    #[arg(long, default_value_t = 20)]
    pub(crate) limit: usize,
    /// Print the report as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct TeacherArgs {
    #[command(flatten)]
    pub(crate) sources: SourceArgs,
    #[command(flatten)]
    pub(crate) filters: FilterArgs,
    /// Teacher name as written in the observation form
    #[arg(long)]
    pub(crate) name: String,
    /// Print the teacher view as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct ObservationArgs {
    #[command(flatten)]
    pub(crate) sources: SourceArgs,
    /// Zero-based data row of the observation in the source export
    #[arg(long)]
    pub(crate) row: usize,
    /// Caller role
    #[arg(long)]
    pub(crate) role: Option<String>,
    /// Print the observation as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) fn run_report(args: ReportArgs) -> Result<(), AppError> {
    let (dataset, scope) = load_dataset(args.sources, args.filters.role.as_deref())?;
    let report = dataset.report(&args.filters.filter(), &scope);

    if args.json {
        print_json(&report)
    } else {
        print!("{}", render_report(&report, args.limit));
        Ok(())
    }
}

pub(crate) fn run_teacher(args: TeacherArgs) -> Result<(), AppError> {
    let (dataset, scope) = load_dataset(args.sources, args.filters.role.as_deref())?;
    let detail = dataset.teacher(&args.name, &args.filters.filter(), &scope);

    if args.json {
        print_json(&detail)
    } else {
        print!("{}", render_teacher(&detail));
        Ok(())
    }
}

pub(crate) fn run_observation(args: ObservationArgs) -> Result<(), AppError> {
    let (dataset, scope) = load_dataset(args.sources, args.role.as_deref())?;
    let detail = dataset.observation(args.row, &scope)?;

    if args.json {
        print_json(&detail)
    } else {
        print!("{}", render_observation(&detail));
        Ok(())
    }
}

fn load_dataset(
    args: SourceArgs,
    role: Option<&str>,
) -> Result<(ObservationDataset, RoleScope), AppError> {
    let mut config = AppConfig::load()?;
    config.telemetry.stderr = true;
    telemetry::init(&config.telemetry)?;

    let SourceArgs {
        data_dir,
        observations,
        cutoffs,
        catalog,
        no_catalog,
        role_programs,
    } = args;
    if let Some(data_dir) = data_dir {
        config.sources.data_dir = data_dir;
    }
    if let Some(observations) = observations {
        config.sources.observations = observations;
    }
    if let Some(cutoffs) = cutoffs {
        config.sources.cutoffs = cutoffs;
    }
    if catalog.is_some() {
        config.sources.catalog = catalog;
    }
    if no_catalog {
        config.sources.catalog = None;
    }

    let roles = role_programs.unwrap_or(config.roles);
    let scope = roles.scope_for(role);
    let source = CsvDirectorySource::new(&config.sources.data_dir);

    match ObservationDataset::load(&source, &config.sources) {
        Ok(dataset) => Ok((dataset, scope)),
        Err(err) => {
            if let Some(preview) = err.preview() {
                eprint!("{}", render_preview(preview));
            }
            Err(err.into())
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), AppError> {
    let body = serde_json::to_string_pretty(value).map_err(std::io::Error::from)?;
    println!("{body}");
    Ok(())
}

fn points(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |value| format!("{value:.1}"))
}

fn share(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |value| format!("{value:.0}%"))
}

fn or_all(value: &Option<String>) -> &str {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or("all")
}

pub(crate) fn render_report(report: &ObservationReport, limit: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Class observation report");
    let _ = writeln!(
        out,
        "Rows loaded: {} ({} skipped) | rubric items: {}",
        report.rows_loaded, report.rows_skipped, report.rubric_items
    );
    let program = match &report.scope {
        RoleScope::Program(program) => format!("{program} (pinned by role)"),
        RoleScope::Unrestricted => or_all(&report.filter.program).to_string(),
    };
    let _ = writeln!(
        out,
        "Filters: period {} | program {} | type {}",
        or_all(&report.filter.period),
        program,
        or_all(&report.filter.observation_type)
    );

    if report.status == ReportStatus::NoResults {
        let _ = writeln!(out, "\n{}", report.status.label());
        return out;
    }

    let _ = writeln!(out, "\nServices");
    for service in &report.services {
        let _ = writeln!(
            out,
            "- {} [{}]: {} observations, {} teachers, avg {} pts",
            service.program_name,
            service.program_id,
            service.observations,
            service.teachers,
            points(service.average_points)
        );
    }

    let _ = writeln!(out, "\nTeachers");
    for teacher in &report.teachers {
        let _ = writeln!(
            out,
            "- {}: {} observations, avg {} pts, {}",
            teacher.teacher,
            teacher.observations,
            points(teacher.average_points),
            if teacher.classification_label.is_empty() {
                "unclassified"
            } else {
                teacher.classification_label
            }
        );
    }

    let _ = writeln!(out, "\nPeriods");
    for period in &report.periods {
        let _ = writeln!(
            out,
            "- {}: {} observations, avg {} pts",
            period.period,
            period.observations,
            points(period.average_points)
        );
    }

    render_distribution(&mut out, "Observation classification", &report.observation_classes);
    render_distribution(&mut out, "Teacher classification", &report.teacher_classes);

    if limit > 0 {
        let shown = report.observations.len().min(limit);
        let _ = writeln!(
            out,
            "\nObservations ({shown} of {})",
            report.observations.len()
        );
        for row in report.observations.iter().take(limit) {
            let _ = writeln!(
                out,
                "- row {} | {} | {} | {} | {} | {} pts ({} answered) | {}",
                row.row,
                row.observed_on
                    .map(|date| date.to_string())
                    .unwrap_or_else(|| row.timestamp.clone()),
                row.teacher,
                row.program_name,
                row.period,
                points(Some(row.total_points)),
                row.answered,
                row.classification_label
            );
        }
    }

    out
}

fn render_distribution(out: &mut String, title: &str, shares: &[ClassificationShare]) {
    let _ = writeln!(out, "\n{title}");
    for entry in shares {
        let _ = writeln!(
            out,
            "- {}: {} ({})",
            entry.label,
            entry.count,
            share(entry.percentage)
        );
    }
}

fn render_areas(out: &mut String, areas: &[AreaBreakdown]) {
    let _ = writeln!(out, "\nAreas");
    for area in areas {
        let _ = writeln!(
            out,
            "- {}: {}/{} pts over {} items ({})",
            area.area_label,
            points(Some(area.points)),
            points(Some(area.max_points)),
            area.answered,
            share(area.percentage)
        );
    }
}

pub(crate) fn render_teacher(detail: &TeacherDetail) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Teacher: {}", detail.teacher);

    let Some(summary) = &detail.summary else {
        let _ = writeln!(out, "{}", detail.status.label());
        return out;
    };

    let _ = writeln!(
        out,
        "{} observations | {} pts total | avg {} pts | {}",
        summary.observations,
        points(Some(summary.total_points)),
        points(summary.average_points),
        summary.classification_label
    );
    render_areas(&mut out, &detail.areas);

    let _ = writeln!(out, "\nObservations");
    for row in &detail.observations {
        let _ = writeln!(
            out,
            "- row {} | {} | {} | {} pts | {}",
            row.row,
            row.program_name,
            row.period,
            points(Some(row.total_points)),
            row.classification_label
        );
    }
    out
}

pub(crate) fn render_observation(detail: &ObservationDetail) -> String {
    let mut out = String::new();
    let row = &detail.observation;
    let _ = writeln!(out, "Observation at row {}", row.row);
    let _ = writeln!(out, "Teacher: {}", row.teacher);
    let _ = writeln!(out, "Program: {} [{}]", row.program_name, row.program_id);
    let _ = writeln!(out, "Period: {} ({})", row.period, row.timestamp);
    if let Some(group) = &row.group {
        let _ = writeln!(out, "Group: {group}");
    }
    if let Some(kind) = &row.observation_type {
        let _ = writeln!(out, "Type: {kind}");
    }
    if let Some(observer) = &row.observer {
        let _ = writeln!(out, "Observer: {observer}");
    }
    let _ = writeln!(
        out,
        "Total: {} pts over {} answered items | {}",
        points(Some(row.total_points)),
        row.answered,
        row.classification_label
    );

    render_areas(&mut out, &detail.areas);

    let _ = writeln!(out, "\nItems");
    for item in &detail.items {
        let _ = writeln!(
            out,
            "{:>3}. {} = {} ({})",
            item.position + 1,
            item.item,
            if item.response.is_empty() {
                "-"
            } else {
                item.response.as_str()
            },
            points(item.points)
        );
    }

    let feedback = &detail.feedback;
    for (title, text) in [
        ("Strengths", &feedback.strengths),
        ("Areas for improvement", &feedback.improvements),
        ("Comments", &feedback.comments),
    ] {
        if let Some(text) = text {
            let _ = writeln!(out, "\n{title}\n{text}");
        }
    }
    out
}

/// Raw view of a table whose columns could not be resolved.
pub(crate) fn render_preview(table: &Table) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "First rows of '{}' as read:", table.name);
    let _ = writeln!(out, "{}", table.headers.join(" | "));
    for row in &table.rows {
        let _ = writeln!(out, "{}", row.join(" | "));
    }
    out
}
