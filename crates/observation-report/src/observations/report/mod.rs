mod areas;
mod distribution;
mod summary;
pub mod views;

pub use areas::{area_breakdown, AreaBreakdown};
pub use distribution::{classification_distribution, ClassificationShare};
pub use summary::{
    average, summarize_periods, summarize_services, summarize_teachers, PeriodSummary,
    ServiceSummary, TeacherSummary,
};
pub use views::{
    FilterOptions, ItemScore, ObservationDetail, ObservationReport, ObservationRow,
    ProgramOption, ReportStatus, TeacherDetail,
};
