use common::plot::Plot;
use fio_basic::{FioBasic, FioComparison};

/// Plots rendered when the config does not list any
pub fn default_plots() -> Vec<Box<dyn Plot>> {
    vec![
        Box::new(FioBasic::default()) as Box<dyn Plot>,
        Box::new(FioComparison::default()),
    ]
}
