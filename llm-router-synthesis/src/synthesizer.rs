//! Merges the per-phase results of a chain into one result and renders it.
//!
//! Output merging by shape:
//! - one result: its output verbatim
//! - all text: successful outputs joined by a blank line
//! - all sequences: successful outputs concatenated
//! - all mappings: successful outputs shallow-merged, later keys win
//! - anything else: every output, failed ones included, as a sequence
//!
//! The last case keeps failed outputs while the typed cases drop them. The
//! asymmetry is deliberate and callers rely on it.

use llm_router_core::{
    Clock, ModelMetrics, ModelOutput, ModelResult, OutputKind, Phase, PhaseResult, PhaseStatus,
    SynthesizerConfig, SystemClock,
};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::{Result, SynthesisError};
use crate::format::{reshape, resolve_format};
use crate::result::{FormattedResult, SynthesisMetadata, SynthesizedResult};
use crate::schema::derive_schema;

const TEXT_SEPARATOR: &str = "\n\n";

pub struct ResultSynthesizer {
    config: SynthesizerConfig,
    clock: Arc<dyn Clock>,
}

impl ResultSynthesizer {
    pub fn new(config: SynthesizerConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: SynthesizerConfig, clock: Arc<dyn Clock>) -> Self {
        Self { config, clock }
    }

    pub fn config(&self) -> &SynthesizerConfig {
        &self.config
    }

    /// Combines results labelled by their position in the chain.
    pub fn combine(&self, results: &[ModelResult]) -> Result<SynthesizedResult> {
        let phases: Vec<PhaseResult> = results
            .iter()
            .enumerate()
            .map(|(index, result)| PhaseResult::new(phase_label(index), result.clone()))
            .collect();
        self.combine_phases(phases)
    }

    /// Combines results that already carry their phase names.
    pub fn combine_phases(&self, phases: Vec<PhaseResult>) -> Result<SynthesizedResult> {
        if phases.is_empty() {
            return Err(SynthesisError::NoResults);
        }
        let results: Vec<ModelResult> = phases.iter().map(|phase| phase.result.clone()).collect();
        if self.config.validate_results {
            validate_results(&results)?;
        }

        let success = self.phases_succeeded(&phases);
        let output = combine_outputs(&results)?;
        let metrics = ModelMetrics::aggregate(results.iter().map(|r| &r.metrics));

        let success_count = results.iter().filter(|r| r.success).count();
        let metadata = SynthesisMetadata {
            timestamp: self.clock.now(),
            result_count: results.len(),
            success_count,
            failure_count: results.len() - success_count,
        };

        info!(
            results = results.len(),
            success_count,
            success,
            "Combined phase results"
        );

        Ok(SynthesizedResult {
            success,
            output: Some(output),
            phases,
            metrics,
            metadata,
        })
    }

    /// Structural check of a combined result.
    pub fn validate(&self, result: &SynthesizedResult) -> bool {
        let totals = [result.metrics.total_execution_time, result.metrics.total_memory_used];
        if !totals.iter().all(|v| v.is_finite() && *v >= 0.0) {
            debug!("Result metrics totals are negative or not finite");
            return false;
        }

        if result.phases.iter().any(|phase| phase.name.is_empty()) {
            debug!("Result has an unnamed phase");
            return false;
        }

        if result.success != self.phases_succeeded(&result.phases) {
            debug!(success = result.success, "Success flag disagrees with phase statuses");
            return false;
        }

        true
    }

    pub fn format(&self, result: &SynthesizedResult) -> Result<FormattedResult> {
        let output = result
            .output
            .as_ref()
            .filter(|output| !output.is_null())
            .ok_or(SynthesisError::InvalidFormatInput)?;

        let format = resolve_format(output, self.config.preferred_format);
        let reshaped = reshape(output, format, self.config.indent_width)?;
        let schema = self
            .config
            .include_schema
            .then(|| derive_schema(&reshaped.to_value()));

        debug!(%format, "Formatted synthesized result");

        Ok(FormattedResult {
            result: SynthesizedResult {
                output: Some(reshaped),
                ..result.clone()
            },
            format,
            schema,
        })
    }

    fn phases_succeeded(&self, phases: &[PhaseResult]) -> bool {
        let completed = |phase: &PhaseResult| phase.status == PhaseStatus::Completed;
        if self.config.require_all_phases {
            phases.iter().all(completed)
        } else {
            phases.iter().any(completed)
        }
    }
}

impl Default for ResultSynthesizer {
    fn default() -> Self {
        Self::new(SynthesizerConfig::default())
    }
}

/// Every result carries finite, non-negative metrics.
pub fn validate_results(results: &[ModelResult]) -> Result<()> {
    match results.iter().position(|r| !r.metrics.is_well_formed()) {
        Some(index) => Err(SynthesisError::InvalidResult {
            index,
            reason: "metrics must be finite and non-negative".to_string(),
        }),
        None => Ok(()),
    }
}

/// `planning`, `context`, `execution`, `review`, then `phase-5` onwards.
pub fn phase_label(index: usize) -> String {
    Phase::ORDER
        .get(index)
        .map(|phase| phase.to_string())
        .unwrap_or_else(|| format!("phase-{}", index + 1))
}

pub fn combine_outputs(results: &[ModelResult]) -> Result<ModelOutput> {
    if let [single] = results {
        return Ok(single.output.clone());
    }

    let successful = || results.iter().filter(|r| r.success).map(|r| &r.output);
    let all_of = |kind: OutputKind| results.iter().all(|r| r.output.kind() == kind);

    if all_of(OutputKind::Text) {
        let joined = successful()
            .filter_map(ModelOutput::as_text)
            .collect::<Vec<_>>()
            .join(TEXT_SEPARATOR);
        return Ok(ModelOutput::Text(joined));
    }

    if all_of(OutputKind::Sequence) {
        let mut items = Vec::new();
        for output in successful() {
            if let ModelOutput::Sequence(seq) = output {
                items.extend(seq.iter().cloned());
            }
        }
        return Ok(ModelOutput::Sequence(items));
    }

    if all_of(OutputKind::Mapping) {
        let mut merged = Map::new();
        for output in successful() {
            if let ModelOutput::Mapping(map) = output {
                merged.extend(map.iter().map(|(k, v)| (k.clone(), v.clone())));
            }
        }
        return Ok(ModelOutput::Mapping(merged));
    }

    let everything = results
        .iter()
        .map(|r| serde_json::to_value(&r.output))
        .collect::<std::result::Result<Vec<Value>, _>>()
        .map_err(|e| SynthesisError::Combination(e.to_string()))?;
    Ok(ModelOutput::Sequence(everything))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_labels_follow_chain_order() {
        let labels: Vec<String> = (0..6).map(phase_label).collect();
        assert_eq!(
            labels,
            vec!["planning", "context", "execution", "review", "phase-5", "phase-6"]
        );
    }
}
