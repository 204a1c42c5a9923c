//! Progressive scan scripts: which components and which band of zig-zag
//! coefficients each scan carries.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::constants::{MAXIMUM_SPECTRAL_INDEX, MAXIMUM_SUCCESSIVE_APPROXIMATION};

/// Components carried by one scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanComponent {
    /// Every frame component, interleaved. Only valid for DC scans.
    All,
    /// One frame component by index (0 = Y, 1 = Cb, 2 = Cr).
    Single(usize),
}

/// One scan of a progressive sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanDescriptor {
    pub component: ScanComponent,
    pub spectral_start: u8,
    pub spectral_end: u8,
    pub successive_approx_high: u8,
    pub successive_approx_low: u8,
}

impl ScanDescriptor {
    pub const fn new(component: ScanComponent, spectral_start: u8, spectral_end: u8) -> Self {
        Self {
            component,
            spectral_start,
            spectral_end,
            successive_approx_high: 0,
            successive_approx_low: 0,
        }
    }

    pub const fn with_approximation(mut self, high: u8, low: u8) -> Self {
        self.successive_approx_high = high;
        self.successive_approx_low = low;
        self
    }

    pub fn is_dc(&self) -> bool {
        self.spectral_start == 0 && self.spectral_end == 0
    }

    /// Frame component indices this scan visits, in SOS order.
    pub fn component_indices(&self, component_count: usize) -> Vec<usize> {
        match self.component {
            ScanComponent::All => (0..component_count).collect(),
            ScanComponent::Single(i) => vec![i],
        }
    }

    fn validate(&self, scan: usize, component_count: usize) -> Result<(), ScanScriptError> {
        if let ScanComponent::Single(component) = self.component {
            if component >= component_count {
                return Err(ScanScriptError::InvalidComponent { scan, component, component_count });
            }
        }
        if self.spectral_start > MAXIMUM_SPECTRAL_INDEX {
            return Err(ScanScriptError::InvalidSpectralStart { scan, start: self.spectral_start });
        }
        if self.spectral_end < self.spectral_start || self.spectral_end > MAXIMUM_SPECTRAL_INDEX {
            return Err(ScanScriptError::InvalidSpectralEnd {
                scan,
                start: self.spectral_start,
                end: self.spectral_end,
            });
        }
        if self.spectral_start == 0 && self.spectral_end != 0 {
            return Err(ScanScriptError::MixedDcAc { scan });
        }
        if self.successive_approx_high > MAXIMUM_SUCCESSIVE_APPROXIMATION {
            return Err(ScanScriptError::InvalidApproxHigh { scan, value: self.successive_approx_high });
        }
        if self.successive_approx_low > MAXIMUM_SUCCESSIVE_APPROXIMATION {
            return Err(ScanScriptError::InvalidApproxLow { scan, value: self.successive_approx_low });
        }
        if self.successive_approx_low > self.successive_approx_high {
            return Err(ScanScriptError::ApproxLowAboveHigh {
                scan,
                low: self.successive_approx_low,
                high: self.successive_approx_high,
            });
        }
        if !self.is_dc() && self.component == ScanComponent::All {
            return Err(ScanScriptError::InterleavedAc { scan });
        }
        Ok(())
    }
}

impl fmt::Display for ScanDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.component {
            ScanComponent::All => write!(f, "all")?,
            ScanComponent::Single(i) => write!(f, "{i}")?,
        }
        write!(f, ":{}-{}", self.spectral_start, self.spectral_end)?;
        if self.successive_approx_high != 0 || self.successive_approx_low != 0 {
            write!(f, ":{}/{}", self.successive_approx_high, self.successive_approx_low)?;
        }
        Ok(())
    }
}

/// Error returned when a scan descriptor cannot be parsed from text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid scan descriptor `{0}`: expected <all|index>:<start>-<end>[:<high>/<low>]")]
pub struct ParseScanDescriptorError(String);

impl FromStr for ScanDescriptor {
    type Err = ParseScanDescriptorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseScanDescriptorError(s.to_string());
        let mut parts = s.trim().split(':');
        let component = match parts.next().ok_or_else(err)?.trim() {
            "all" | "-1" => ScanComponent::All,
            index => ScanComponent::Single(index.parse().map_err(|_| err())?),
        };
        let (start, end) = parts.next().ok_or_else(err)?.split_once('-').ok_or_else(err)?;
        let mut descriptor = ScanDescriptor::new(
            component,
            start.trim().parse().map_err(|_| err())?,
            end.trim().parse().map_err(|_| err())?,
        );
        if let Some(approx) = parts.next() {
            let (high, low) = approx.split_once('/').ok_or_else(err)?;
            descriptor = descriptor.with_approximation(
                high.trim().parse().map_err(|_| err())?,
                low.trim().parse().map_err(|_| err())?,
            );
        }
        if parts.next().is_some() {
            return Err(err());
        }
        Ok(descriptor)
    }
}

/// Reasons a scan script is rejected. `scan` is the index of the offending descriptor.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScanScriptError {
    #[error("scan script cannot be empty")]
    Empty,
    #[error("scan {scan} has invalid component {component} (image has {component_count})")]
    InvalidComponent { scan: usize, component: usize, component_count: usize },
    #[error("scan {scan} has invalid spectral start {start} (must be 0-63)")]
    InvalidSpectralStart { scan: usize, start: u8 },
    #[error("scan {scan} has invalid spectral end {end} (must be {start}-63)")]
    InvalidSpectralEnd { scan: usize, start: u8, end: u8 },
    #[error("scan {scan} mixes the DC coefficient with AC coefficients")]
    MixedDcAc { scan: usize },
    #[error("scan {scan} has invalid successive approximation high {value} (must be 0-13)")]
    InvalidApproxHigh { scan: usize, value: u8 },
    #[error("scan {scan} has invalid successive approximation low {value} (must be 0-13)")]
    InvalidApproxLow { scan: usize, value: u8 },
    #[error("scan {scan} has successive approximation low > high ({low} > {high})")]
    ApproxLowAboveHigh { scan: usize, low: u8, high: u8 },
    #[error("AC scan {scan} cannot interleave all components")]
    InterleavedAc { scan: usize },
    #[error("scan {scan} requests successive approximation refinement, which is not encoded")]
    RefinementNotSupported { scan: usize },
}

/// What the encoder does with a script that fails validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanScriptPolicy {
    /// Log a warning and use the default script for the component count.
    #[default]
    Lenient,
    /// Fail the encode with `JpegError::InvalidScanScript`.
    Strict,
}

/// Ordered sequence of scans; order is significant.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScanScript {
    pub scans: Vec<ScanDescriptor>,
}

impl ScanScript {
    pub fn new(scans: Vec<ScanDescriptor>) -> Self {
        Self { scans }
    }

    /// DC, low-frequency AC, then the remaining AC band.
    pub fn default_grayscale() -> Self {
        use ScanComponent::Single;
        Self::new(vec![
            ScanDescriptor::new(Single(0), 0, 0),
            ScanDescriptor::new(Single(0), 1, 9),
            ScanDescriptor::new(Single(0), 10, 63),
        ])
    }

    /// Interleaved DC first, then luma detail ahead of chroma.
    pub fn default_color() -> Self {
        use ScanComponent::{All, Single};
        Self::new(vec![
            ScanDescriptor::new(All, 0, 0),
            ScanDescriptor::new(Single(0), 1, 2),
            ScanDescriptor::new(Single(0), 3, 9),
            ScanDescriptor::new(Single(1), 1, 5),
            ScanDescriptor::new(Single(2), 1, 5),
            ScanDescriptor::new(Single(0), 10, 63),
            ScanDescriptor::new(Single(1), 6, 63),
            ScanDescriptor::new(Single(2), 6, 63),
        ])
    }

    pub fn default_for(component_count: usize) -> Self {
        if component_count == 1 { Self::default_grayscale() } else { Self::default_color() }
    }

    /// The single sequential scan: every component, every coefficient.
    pub fn baseline() -> Self {
        Self::new(vec![ScanDescriptor::new(ScanComponent::All, 0, MAXIMUM_SPECTRAL_INDEX)])
    }

    pub fn len(&self) -> usize {
        self.scans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scans.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ScanDescriptor> {
        self.scans.iter()
    }

    pub fn validate(&self, component_count: usize) -> Result<(), ScanScriptError> {
        if self.scans.is_empty() {
            return Err(ScanScriptError::Empty);
        }
        for (i, scan) in self.scans.iter().enumerate() {
            scan.validate(i, component_count)?;
        }
        Ok(())
    }

    /// Validation plus the encoder's own restriction: first-pass scans only.
    pub fn check_encodable(&self, component_count: usize) -> Result<(), ScanScriptError> {
        self.validate(component_count)?;
        match self.scans.iter().position(|s| s.successive_approx_high != 0) {
            Some(scan) => Err(ScanScriptError::RefinementNotSupported { scan }),
            None => Ok(()),
        }
    }

    /// Picks the script an encode will run. Without a requested script the
    /// default for `component_count` is used.
    pub fn resolve(
        requested: Option<&ScanScript>,
        component_count: usize,
        policy: ScanScriptPolicy,
    ) -> Result<ScanScript, ScanScriptError> {
        let Some(script) = requested else {
            return Ok(Self::default_for(component_count));
        };
        match script.check_encodable(component_count) {
            Ok(()) => Ok(script.clone()),
            Err(err) if policy == ScanScriptPolicy::Lenient => {
                log::warn!("{err}; falling back to the default scan script");
                Ok(Self::default_for(component_count))
            }
            Err(err) => Err(err),
        }
    }
}

impl FromIterator<ScanDescriptor> for ScanScript {
    fn from_iter<I: IntoIterator<Item = ScanDescriptor>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a ScanScript {
    type Item = &'a ScanDescriptor;
    type IntoIter = std::slice::Iter<'a, ScanDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.scans.iter()
    }
}

impl fmt::Display for ScanScript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, scan) in self.scans.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{scan}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_scripts_are_valid() {
        assert!(ScanScript::default_grayscale().validate(1).is_ok());
        assert!(ScanScript::default_color().validate(3).is_ok());
        assert_eq!(ScanScript::default_color().len(), 8);
        // The colour default selects Cb and Cr, which a grayscale image lacks.
        assert_eq!(
            ScanScript::default_color().validate(1),
            Err(ScanScriptError::InvalidComponent { scan: 3, component: 1, component_count: 1 })
        );
    }

    #[test]
    fn validation_names_the_offending_scan() {
        let script: ScanScript = ["0:0-0", "0:5-2"].iter().map(|s| s.parse().unwrap()).collect();
        assert_eq!(
            script.validate(1),
            Err(ScanScriptError::InvalidSpectralEnd { scan: 1, start: 5, end: 2 })
        );
        let script: ScanScript = ["all:1-5".parse().unwrap()].into_iter().collect();
        assert_eq!(script.validate(3), Err(ScanScriptError::InterleavedAc { scan: 0 }));
        let script: ScanScript = ["0:0-0:1/2".parse().unwrap()].into_iter().collect();
        assert_eq!(script.validate(1), Err(ScanScriptError::ApproxLowAboveHigh { scan: 0, low: 2, high: 1 }));
        assert_eq!(ScanScript::default().validate(1), Err(ScanScriptError::Empty));
        let script: ScanScript = ["0:0-64".parse().unwrap()].into_iter().collect();
        assert!(matches!(script.validate(1), Err(ScanScriptError::InvalidSpectralEnd { .. })));
        let script: ScanScript = ["0:0-63".parse().unwrap()].into_iter().collect();
        assert_eq!(script.validate(1), Err(ScanScriptError::MixedDcAc { scan: 0 }));
    }

    #[test]
    fn refinement_is_valid_but_not_encodable() {
        let script: ScanScript = ["0:0-0", "0:1-63:1/0"].iter().map(|s| s.parse().unwrap()).collect();
        assert!(script.validate(1).is_ok());
        assert_eq!(script.check_encodable(1), Err(ScanScriptError::RefinementNotSupported { scan: 1 }));
    }

    #[test]
    fn resolve_honours_the_policy() {
        let bad: ScanScript = ["all:1-63".parse().unwrap()].into_iter().collect();
        let lenient = ScanScript::resolve(Some(&bad), 3, ScanScriptPolicy::Lenient).unwrap();
        assert_eq!(lenient, ScanScript::default_color());
        assert!(ScanScript::resolve(Some(&bad), 3, ScanScriptPolicy::Strict).is_err());
        assert_eq!(
            ScanScript::resolve(None, 1, ScanScriptPolicy::Strict).unwrap(),
            ScanScript::default_grayscale()
        );
    }

    #[test]
    fn descriptor_text_form() {
        let d: ScanDescriptor = "-1:0-0".parse().unwrap();
        assert_eq!(d, ScanDescriptor::new(ScanComponent::All, 0, 0));
        assert_eq!(d.to_string(), "all:0-0");
        let d: ScanDescriptor = "2:6-63:2/1".parse().unwrap();
        assert_eq!(d.to_string(), "2:6-63:2/1");
        assert!("x:0-0".parse::<ScanDescriptor>().is_err());
        assert!("0:0".parse::<ScanDescriptor>().is_err());
        assert!("0:0-0:1/0:9".parse::<ScanDescriptor>().is_err());
        assert_eq!(
            ScanScript::default_grayscale().to_string(),
            "0:0-0 0:1-9 0:10-63"
        );
    }
}
