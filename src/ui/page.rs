//! Simulation page controller.
//!
//! Composes the selector and the results presenter: "Run" goes to a
//! `SimulationRunner`, the returned result is handed to the presenter.

use tracing::{error, info};

use super::results::{self, ResultsView};
use super::selector::CountrySelector;
use crate::client::{CountrySource, SimulationRunner};
use crate::types::{ExportFormat, Gender, SimulationRequest, SimulationResult};

pub struct SimulationPage {
    selector: CountrySelector,
    result: Option<SimulationResult>,
    gender: Gender,
}

impl SimulationPage {
    /// Mount the page; fetches the country list once.
    pub async fn mount(source: &dyn CountrySource) -> Self {
        Self {
            selector: CountrySelector::mount(source).await,
            result: None,
            gender: Gender::Both,
        }
    }

    pub fn selector(&self) -> &CountrySelector {
        &self.selector
    }

    pub fn selector_mut(&mut self) -> &mut CountrySelector {
        &mut self.selector
    }

    pub fn result(&self) -> Option<&SimulationResult> {
        self.result.as_ref()
    }

    pub fn set_gender(&mut self, gender: Gender) {
        self.gender = gender;
    }

    /// Run the current selection. The previous result is kept when the
    /// runner fails. Returns whether a new result arrived.
    pub async fn run(&mut self, runner: &dyn SimulationRunner) -> bool {
        let mut request = None;
        let gender = self.gender;
        self.selector.run(|code, parameters| {
            request = Some(SimulationRequest {
                country: code.to_string(),
                parameters: *parameters,
                gender,
            });
        });
        let Some(request) = request else {
            return false;
        };

        self.selector.set_loading(true);
        let outcome = runner.run_simulation(&request).await;
        self.selector.set_loading(false);

        match outcome {
            Ok(result) => {
                info!(
                    country = %result.country,
                    change = format!("{:+.2}", result.prediction.change),
                    "Simulation result received"
                );
                self.result = Some(result);
                true
            }
            Err(e) => {
                error!(error = %e, country = %request.country, "Simulation failed");
                false
            }
        }
    }

    pub fn results_view(&self) -> ResultsView {
        results::present(self.result.as_ref())
    }

    /// Forward an export click to `on_export`. Ignored while there is no
    /// result to export.
    pub fn export<F: FnOnce(ExportFormat)>(&self, format: ExportFormat, on_export: F) -> bool {
        match self
            .results_view()
            .exports()
            .iter()
            .find(|b| b.format == format)
        {
            Some(button) => {
                button.click(on_export);
                true
            }
            None => false,
        }
    }
}
