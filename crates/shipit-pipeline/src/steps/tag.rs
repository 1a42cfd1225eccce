//! Tag the release

use tracing::info;

use shipit_core::{Result, VcError};

use crate::context::StepContext;
use crate::step::{invalid, not_prepared, Step, StepArgs};

const VERSION_PLACEHOLDER: &str = "{version}";

/// `tag [format] [message]`
///
/// The tag name is `format` with `{version}` replaced by the release version.
/// Prepare fails when the tag already exists.
#[derive(Debug)]
pub struct Tag {
    format: String,
    message: Option<String>,
    tag: Option<String>,
}

impl Default for Tag {
    fn default() -> Self {
        Self {
            format: VERSION_PLACEHOLDER.to_string(),
            message: None,
            tag: None,
        }
    }
}

impl Tag {
    /// Kind identifier
    pub const KIND: &'static str = "tag";

    /// Tag named after the bare version
    pub fn new() -> Self {
        Self::default()
    }

    /// Tag name format, e.g. `v{version}`
    pub fn format(&mut self, format: impl Into<String>) -> Result<&mut Self> {
        let format = format.into();
        if !format.contains(VERSION_PLACEHOLDER) {
            return Err(invalid(
                Self::KIND,
                format!("tag format '{}' has no {} placeholder", format, VERSION_PLACEHOLDER),
            ));
        }
        self.format = format;
        Ok(self)
    }

    /// Annotation message
    pub fn message(&mut self, message: impl Into<String>) -> &mut Self {
        self.message = Some(message.into());
        self
    }

    /// Tag name computed by prepare
    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    /// Registry factory
    pub fn from_args(args: &StepArgs) -> Result<Box<dyn Step>> {
        args.at_most(Self::KIND, 2)?;
        let mut step = Self::new();
        if let Some(format) = args.get(0) {
            step.format(format)?;
        }
        if let Some(message) = args.get(1) {
            step.message(message);
        }
        Ok(Box::new(step))
    }
}

impl Step for Tag {
    fn kind(&self) -> &'static str {
        Self::KIND
    }

    fn describe(&self) -> String {
        match &self.tag {
            Some(tag) => format!("tag {}", tag),
            None => "tag".to_string(),
        }
    }

    fn prepare(&mut self, ctx: &mut StepContext) -> Result<()> {
        let version = ctx.release.require_version()?;
        let tag = self.format.replace(VERSION_PLACEHOLDER, version);

        let vc = ctx.vc()?;
        if vc.exists_tagged_version(&tag)? {
            return Err(VcError::TagAlreadyExists(tag).into());
        }
        self.tag = Some(tag);
        Ok(())
    }

    fn run(&mut self, ctx: &mut StepContext) -> Result<()> {
        let tag = self.tag.clone().ok_or_else(|| not_prepared(Self::KIND))?;
        let message = self
            .message
            .clone()
            .unwrap_or_else(|| format!("Release {}", tag));

        let vc = ctx.vc()?;
        vc.tag_version(&tag, Some(&message))?;
        info!(backend = vc.name(), %tag, "tagged");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::steps::test_support::{config, context, FakeBackend};
    use shipit_core::ShipitError;
    use std::sync::Arc;

    #[test]
    fn test_tag_release() {
        let backend = Arc::new(FakeBackend::default());
        let mut ctx = context("/tmp", config("1.2.4"), backend.clone());
        let mut step = Tag::new();

        step.prepare(&mut ctx).unwrap();
        assert_eq!(step.tag(), Some("1.2.4"));
        step.run(&mut ctx).unwrap();

        assert_eq!(
            backend.calls(),
            vec!["exists 1.2.4", "tag 1.2.4 Release 1.2.4"]
        );
    }

    #[test]
    fn test_existing_tag_fails_prepare() {
        let backend = Arc::new(FakeBackend::default());
        backend.tags.lock().unwrap().push("v1.2.4".to_string());
        let mut ctx = context("/tmp", config("1.2.4"), backend.clone());

        let mut step = Tag::new();
        step.format("v{version}").unwrap();
        let err = step.prepare(&mut ctx).unwrap_err();
        assert!(matches!(
            err,
            ShipitError::Vc(VcError::TagAlreadyExists(ref t)) if t == "v1.2.4"
        ));
    }

    #[test]
    fn test_from_args() {
        let backend = Arc::new(FakeBackend::default());
        let mut ctx = context("/tmp", config("0.3.0"), backend.clone());
        let mut step = Tag::from_args(&StepArgs::from(["rel-{version}", "Ship it"])).unwrap();
        step.prepare(&mut ctx).unwrap();
        step.run(&mut ctx).unwrap();
        assert_eq!(backend.calls()[1], "tag rel-0.3.0 Ship it");

        assert!(Tag::from_args(&StepArgs::from(["latest"])).is_err());
        assert!(Tag::from_args(&StepArgs::from(["a{version}", "b", "c"])).is_err());
    }
}
