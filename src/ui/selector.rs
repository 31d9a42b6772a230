//! Country/parameter selector.
//!
//! Holds the fetched country list, the selected country, and the three
//! slider values. Parameters always start from the selected country's
//! baseline; switching country or pressing "Reset" restores it. While
//! `is_loading` is set the sliders, "Run" and "Reset" are disabled.

use tracing::{debug, warn};

use super::format;
use crate::client::CountrySource;
use crate::types::{Country, ParameterField, ParameterSet};

pub const RUN_LABEL: &str = "Run Simulation";
pub const RUN_BUSY_LABEL: &str = "Running Simulation...";
pub const RESET_LABEL: &str = "Reset to Baseline";
pub const NO_COUNTRIES_LABEL: &str = "No countries available";

/// Selector component state.
#[derive(Debug, Clone, Default)]
pub struct CountrySelector {
    countries: Vec<Country>,
    selected: Option<usize>,
    parameters: ParameterSet,
    is_loading: bool,
}

impl CountrySelector {
    /// Build a selector over an already-fetched list. The first entry is
    /// selected.
    pub fn with_countries(countries: Vec<Country>) -> Self {
        let mut selector = Self {
            countries,
            ..Self::default()
        };
        if !selector.countries.is_empty() {
            selector.selected = Some(0);
            selector.reset_to_baseline();
        }
        selector
    }

    /// Mount: fetch the country list once. A failed fetch is logged and
    /// leaves the selector usable with an empty list.
    pub async fn mount(source: &dyn CountrySource) -> Self {
        match source.fetch_countries().await {
            Ok(countries) => {
                debug!(count = countries.len(), "Countries fetched");
                Self::with_countries(countries)
            }
            Err(e) => {
                warn!(error = %e, "Failed to fetch countries");
                Self::default()
            }
        }
    }

    pub fn countries(&self) -> &[Country] {
        &self.countries
    }

    pub fn selected_country(&self) -> Option<&Country> {
        self.selected.and_then(|i| self.countries.get(i))
    }

    pub fn parameters(&self) -> &ParameterSet {
        &self.parameters
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.is_loading = loading;
    }

    /// Select a country by code and reset parameters to its baseline.
    /// Returns `false` (and changes nothing) for an unknown code.
    pub fn select_country(&mut self, code: &str) -> bool {
        match self.countries.iter().position(|c| c.code == code) {
            Some(index) => {
                self.selected = Some(index);
                self.reset_to_baseline();
                true
            }
            None => false,
        }
    }

    /// Slider input: update one field, clamped to its range. Ignored while
    /// loading or for non-finite input.
    pub fn set_parameter(&mut self, field: ParameterField, value: f64) -> bool {
        if self.is_loading || !value.is_finite() {
            return false;
        }
        let (min, max) = self.range(field);
        self.parameters.set(field, value.clamp(min, max));
        true
    }

    /// Slider range for `field`, widened around the selected baseline.
    pub fn range(&self, field: ParameterField) -> (f64, f64) {
        match self.selected_country() {
            Some(country) => field.range_for(&country.baseline),
            None => field.range(),
        }
    }

    /// "Reset" button.
    pub fn reset(&mut self) -> bool {
        if self.is_loading {
            return false;
        }
        self.reset_to_baseline();
        true
    }

    fn reset_to_baseline(&mut self) {
        self.parameters = self
            .selected_country()
            .map(|c| ParameterSet::from_baseline(&c.baseline))
            .unwrap_or_default();
    }

    /// "Run" button: hands the selected code and current parameters to
    /// `on_run`. Does nothing while loading or with no country selected.
    pub fn run<F>(&self, on_run: F) -> bool
    where
        F: FnOnce(&str, &ParameterSet),
    {
        if self.is_loading {
            return false;
        }
        match self.selected_country() {
            Some(country) => {
                on_run(&country.code, &self.parameters);
                true
            }
            None => false,
        }
    }

    /// Render the current state.
    pub fn view(&self) -> SelectorView {
        let disabled = self.is_loading;
        let selected = self.selected_country();

        SelectorView {
            options: self
                .countries
                .iter()
                .map(|c| CountryOption {
                    code: c.code.clone(),
                    name: c.name.clone(),
                    selected: selected.is_some_and(|s| s.code == c.code),
                })
                .collect(),
            baseline: selected.map(|c| {
                vec![
                    format!("Life Expectancy: {} years", format::fixed(c.baseline.life_expectancy, 1)),
                    format!("Doctor Density: {} per 1,000", format::fixed(c.baseline.doctor_density, 1)),
                    format!("Nurse Density: {} per 1,000", format::fixed(c.baseline.nurse_density, 1)),
                    format!("Health Spending: {}% of GDP", format::plain(c.baseline.health_spending)),
                    format!("Data Year: {}", c.baseline.year),
                    format!("Data Quality: {}%", format::plain(c.data_quality)),
                ]
            }),
            sliders: ParameterField::ALL
                .iter()
                .map(|&field| {
                    let value = self.parameters.get(field);
                    let (min, max) = self.range(field);
                    SliderView {
                        field,
                        label: slider_label(field, value),
                        value,
                        min,
                        max,
                        step: field.step(),
                        disabled,
                    }
                })
                .collect(),
            run_button: ButtonView {
                label: if disabled { RUN_BUSY_LABEL } else { RUN_LABEL }.to_string(),
                disabled: disabled || selected.is_none(),
            },
            reset_button: ButtonView {
                label: RESET_LABEL.to_string(),
                disabled,
            },
        }
    }
}

/// Live slider label: one decimal for densities, plain percentage for
/// spending.
pub fn slider_label(field: ParameterField, value: f64) -> String {
    if field.is_percentage() {
        format!("{}: {}%", field.label(), format::plain(value))
    } else {
        format!("{}: {}", field.label(), format::fixed(value, 1))
    }
}

// ---------------------------------------------------------------------------
// View model
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct CountryOption {
    pub code: String,
    pub name: String,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SliderView {
    pub field: ParameterField,
    pub label: String,
    pub value: f64,
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub disabled: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ButtonView {
    pub label: String,
    pub disabled: bool,
}

/// Rendered selector.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectorView {
    pub options: Vec<CountryOption>,
    /// Baseline display lines; `None` until a country is selected.
    pub baseline: Option<Vec<String>>,
    pub sliders: Vec<SliderView>,
    pub run_button: ButtonView,
    pub reset_button: ButtonView,
}

impl SelectorView {
    pub fn slider(&self, field: ParameterField) -> Option<&SliderView> {
        self.sliders.iter().find(|s| s.field == field)
    }
}

impl std::fmt::Display for SelectorView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.options.is_empty() {
            writeln!(f, "Country: {NO_COUNTRIES_LABEL}")?;
        } else {
            let current = self
                .options
                .iter()
                .find(|o| o.selected)
                .map(|o| format!("{} ({})", o.name, o.code))
                .unwrap_or_default();
            writeln!(f, "Country: {current}")?;
        }
        if let Some(lines) = &self.baseline {
            for line in lines {
                writeln!(f, "  {line}")?;
            }
        }
        for slider in &self.sliders {
            writeln!(f, "{}", slider.label)?;
        }
        let mark = |b: &ButtonView| if b.disabled { " (disabled)" } else { "" };
        writeln!(f, "[{}]{}", self.run_button.label, mark(&self.run_button))?;
        write!(f, "[{}]{}", self.reset_button.label, mark(&self.reset_button))
    }
}
