//! SVG flamegraph generation from collapsed stacks.

use crate::aggregator::stack_builder::CollapsedStack;
use crate::utils::error::FlamegraphError;
use log::{debug, info};

/// Flamegraph configuration
#[derive(Debug, Clone)]
pub struct FlamegraphConfig {
    pub title: String,

    /// Image width in pixels; inferno's default when `None`
    pub width: Option<usize>,
}

impl Default for FlamegraphConfig {
    fn default() -> Self {
        Self {
            title: "snapprof profile".to_string(),
            width: None,
        }
    }
}

impl FlamegraphConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_width(mut self, width: usize) -> Self {
        self.width = Some(width);
        self
    }
}

/// Generate SVG flamegraph from collapsed stacks
///
/// **Public** - main entry point for flamegraph generation
///
/// # Errors
/// * `FlamegraphError::EmptyStacks` - nothing to draw
/// * `FlamegraphError::Render` - inferno failed to render
pub fn generate_flamegraph(
    stacks: &[CollapsedStack],
    config: &FlamegraphConfig,
) -> Result<String, FlamegraphError> {
    if stacks.is_empty() {
        return Err(FlamegraphError::EmptyStacks);
    }

    let lines: Vec<String> = stacks.iter().map(CollapsedStack::to_line).collect();
    debug!("Rendering flamegraph from {} stacks", lines.len());

    let mut options = inferno::flamegraph::Options::default();
    options.title = config.title.clone();
    options.count_name = "samples".to_string();
    options.image_width = config.width;

    let mut svg = Vec::new();
    inferno::flamegraph::from_lines(&mut options, lines.iter().map(String::as_str), &mut svg)
        .map_err(|e| FlamegraphError::Render(e.to_string()))?;

    info!("Flamegraph generated ({} bytes)", svg.len());

    Ok(String::from_utf8_lossy(&svg).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_stacks_rejected() {
        let result = generate_flamegraph(&[], &FlamegraphConfig::default());
        assert!(matches!(result, Err(FlamegraphError::EmptyStacks)));
    }

    #[test]
    fn test_generate_flamegraph() {
        let stacks = vec![
            CollapsedStack::new("main;work;hash_block".to_string(), 12),
            CollapsedStack::new("main;idle".to_string(), 3),
        ];
        let config = FlamegraphConfig::new().with_title("test profile").with_width(800);

        let svg = generate_flamegraph(&stacks, &config).unwrap();

        assert!(svg.contains("<svg"));
        assert!(svg.contains("test profile"));
        assert!(svg.contains("hash_block"));
    }
}
