use observation_report::observations::report::ReportStatus;
use observation_report::observations::{
    Classification, ObservationDataset, ObservationFilter, RoleScope, NO_PERIOD,
};
use observation_report::sources::Table;

const CUTOFFS: &str = "Corte,Fecha inicio,Fecha fin\nSpring,2024-01-01,2024-06-30\n";
const CATALOG: &str = "ID,Programa,Alias\nHIS,Licenciatura en Historia,Historia\n";

fn observation_table(rows: &[(&str, &str, &str, Vec<&str>)]) -> Table {
    let mut csv = String::from("Marca temporal,Programa educativo,Nombre del docente");
    for item in 1..=40 {
        csv.push_str(&format!(",Item {item}"));
    }
    csv.push('\n');

    for (timestamp, service, teacher, responses) in rows {
        csv.push_str(&format!("{timestamp},{service},{teacher}"));
        for position in 0..40 {
            csv.push(',');
            csv.push_str(responses.get(position).copied().unwrap_or(""));
        }
        csv.push('\n');
    }

    Table::from_reader("observations", csv.as_bytes()).expect("observation csv parses")
}

fn table(name: &str, csv: &str) -> Table {
    Table::from_reader(name, csv.as_bytes()).expect("csv parses")
}

fn dataset(rows: &[(&str, &str, &str, Vec<&str>)]) -> ObservationDataset {
    ObservationDataset::from_tables(
        &observation_table(rows),
        &table("cutoffs", CUTOFFS),
        Some(&table("catalog", CATALOG)),
    )
    .expect("dataset loads")
}

#[test]
fn all_affirmative_observation_is_consolidated() {
    let dataset = dataset(&[("2024-03-15", "Historia", "Ana Ruiz", vec!["Sí"; 40])]);

    let observation = &dataset.observations()[0];
    assert_eq!(observation.total_points, 120.0);
    assert_eq!(observation.answered, 40);
    assert_eq!(observation.classification, Some(Classification::Consolidated));

    let report = dataset.report(&ObservationFilter::default(), &RoleScope::Unrestricted);
    assert_eq!(report.observations[0].classification_label, "Consolidated");
    assert!(report
        .observation_classes
        .iter()
        .any(|share| share.classification == Classification::Consolidated && share.count == 1));
}

#[test]
fn teacher_is_classified_on_the_average_total() {
    let mut strong = vec!["Sí"; 39];
    strong.push("13");
    let weak = vec!["No"; 40];

    let dataset = dataset(&[
        ("2024-03-15", "Historia", "Ana Ruiz", strong),
        ("2024-04-10", "Historia", "Ana Ruiz", weak),
    ]);

    let classes: Vec<_> = dataset
        .observations()
        .iter()
        .map(|observation| (observation.total_points, observation.classification))
        .collect();
    assert_eq!(
        classes,
        vec![
            (130.0, Some(Classification::Consolidated)),
            (40.0, Some(Classification::NotConsolidated)),
        ]
    );

    let report = dataset.report(&ObservationFilter::default(), &RoleScope::Unrestricted);
    let teacher = &report.teachers[0];
    assert_eq!(teacher.observations, 2);
    assert_eq!(teacher.average_points, Some(85.0));
    assert_eq!(teacher.classification, Some(Classification::InProgress));
    assert_eq!(teacher.classification_label, "In progress");
}

#[test]
fn observations_are_tagged_with_their_cutoff_period() {
    let dataset = dataset(&[
        ("2024-03-15", "Historia", "Ana Ruiz", vec!["Sí"]),
        ("2024-08-01", "Historia", "Ana Ruiz", vec!["Sí"]),
        ("sin fecha", "Historia", "Luis Pérez", vec!["Sí"]),
    ]);

    let periods: Vec<&str> = dataset
        .observations()
        .iter()
        .map(|observation| observation.period.as_str())
        .collect();
    assert_eq!(periods, vec!["Spring", NO_PERIOD, NO_PERIOD]);

    let spring_only = ObservationFilter {
        period: Some("Spring".to_string()),
        ..ObservationFilter::default()
    };
    let report = dataset.report(&spring_only, &RoleScope::Unrestricted);
    assert_eq!(report.observations.len(), 1);
    assert_eq!(report.periods.len(), 1);
    assert_eq!(report.periods[0].period, "Spring");
}

#[test]
fn unknown_service_keeps_raw_text_and_forms_its_own_group() {
    let dataset = dataset(&[
        ("2024-03-15", "Historia", "Ana Ruiz", vec!["Sí", "Sí"]),
        ("2024-03-16", "Diplomado en Robótica", "Luis Pérez", vec!["No"]),
        ("2024-03-17", "Diplomado en Robótica", "Marta Gil", vec!["Sí"]),
    ]);

    let robotics = &dataset.observations()[1].program;
    assert_eq!(robotics.id, "Diplomado en Robótica");
    assert_eq!(robotics.name, "Diplomado en Robótica");
    assert!(!robotics.matched);

    let report = dataset.report(&ObservationFilter::default(), &RoleScope::Unrestricted);
    assert_eq!(report.services.len(), 2);
    let group = report
        .services
        .iter()
        .find(|service| service.program_id == "Diplomado en Robótica")
        .expect("fallback group present");
    assert_eq!(group.observations, 2);
    assert_eq!(group.teachers, 2);
    assert_eq!(group.total_points, 4.0);
    assert_eq!(group.average_points, Some(2.0));

    let history = report
        .services
        .iter()
        .find(|service| service.program_id == "HIS")
        .expect("catalog group present");
    assert_eq!(history.program_name, "Licenciatura en Historia");
}

#[test]
fn pinned_role_and_filters_compose() {
    let dataset = dataset(&[
        ("2024-03-15", "Historia", "Ana Ruiz", vec!["Sí"]),
        ("2024-03-16", "Diplomado en Robótica", "Luis Pérez", vec!["No"]),
    ]);

    let filter = ObservationFilter {
        program: Some("Diplomado en Robótica".to_string()),
        ..ObservationFilter::default()
    };
    let scope = RoleScope::Program("HIS".to_string());
    let report = dataset.report(&filter, &scope);

    assert_eq!(report.status, ReportStatus::Ready);
    assert_eq!(report.observations.len(), 1);
    assert_eq!(report.observations[0].program_id, "HIS");

    let options = dataset.options(&scope);
    assert_eq!(options.programs.len(), 1);
    assert_eq!(options.programs[0].name, "Licenciatura en Historia");
}

#[test]
fn area_breakdown_uses_only_answered_items() {
    let mut responses = vec![""; 40];
    responses[0] = "Sí";
    responses[20] = "No se evidencia";
    responses[31] = "No";
    responses[39] = "x";
    let dataset = dataset(&[("2024-03-15", "Historia", "Ana Ruiz", responses)]);

    let detail = dataset
        .observation(0, &RoleScope::Unrestricted)
        .expect("observation present");
    let summary: Vec<(f64, f64, usize)> = detail
        .areas
        .iter()
        .map(|area| (area.points, area.max_points, area.answered))
        .collect();
    assert_eq!(
        summary,
        vec![(3.0, 3.0, 1), (2.0, 3.0, 1), (1.0, 3.0, 1), (3.0, 3.0, 1)]
    );
    assert_eq!(detail.observation.total_points, 9.0);
    assert_eq!(detail.items[20].response, "No se evidencia");
    assert_eq!(detail.items[5].points, None);
}

#[test]
fn extra_date_and_class_size_columns_do_not_shift_the_rubric() {
    let mut csv = String::from(
        "Marca temporal,Fecha de observación,Número de estudiantes,Programa,Docente",
    );
    for item in 1..=40 {
        csv.push_str(&format!(",Item {item}"));
    }
    csv.push_str("\n20/03/2024 18:00:00,14/03/2024,25,Historia,Ana Ruiz");
    for _ in 0..40 {
        csv.push_str(",Sí");
    }
    csv.push('\n');

    let dataset = ObservationDataset::from_tables(
        &table("observations", &csv),
        &table("cutoffs", CUTOFFS),
        Some(&table("catalog", CATALOG)),
    )
    .expect("dataset loads");

    assert_eq!(dataset.rubric_items().len(), 40);
    assert_eq!(dataset.rubric_items()[0], "Item 1");
    let observation = &dataset.observations()[0];
    assert_eq!(observation.total_points, 120.0);
    assert_eq!(observation.answered, 40);
    assert_eq!(observation.period, "Spring");

    let detail = dataset
        .observation(0, &RoleScope::Unrestricted)
        .expect("observation present");
    let answered: Vec<usize> = detail.areas.iter().map(|area| area.answered).collect();
    assert_eq!(answered, vec![14, 16, 4, 6]);
    assert_eq!(
        detail.observation.observed_on,
        chrono::NaiveDate::from_ymd_opt(2024, 3, 14)
    );
}

#[test]
fn teacher_detail_groups_names_that_differ_only_in_case() {
    let dataset = dataset(&[
        ("2024-03-15", "Historia", "Ana Ruiz", vec!["Sí"; 40]),
        ("2024-03-20", "Historia", "ANA RUIZ", vec!["No"; 40]),
    ]);

    let detail = dataset.teacher(
        "ana ruiz",
        &ObservationFilter::default(),
        &RoleScope::Unrestricted,
    );
    assert_eq!(detail.observations.len(), 2);
    let summary = detail.summary.expect("summary present");
    assert_eq!(summary.observations, 2);
    assert_eq!(summary.total_points, 160.0);
    assert_eq!(summary.average_points, Some(80.0));

    let report = dataset.report(&ObservationFilter::default(), &RoleScope::Unrestricted);
    assert_eq!(report.teachers.len(), 1);
    assert_eq!(report.services[0].teachers, 1);
}
