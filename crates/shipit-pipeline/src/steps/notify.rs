//! Announce the release on the status feed

use tracing::info;

use shipit_core::Result;

use crate::context::StepContext;
use crate::step::{Step, StepArgs};

/// `notify [message...]`
///
/// Prepare checks the feed credentials; run posts `message`, or the default
/// announcement built from the release metadata.
#[derive(Debug, Default)]
pub struct PublishNotify {
    message: Option<String>,
}

impl PublishNotify {
    /// Kind identifier
    pub const KIND: &'static str = "notify";

    /// Post the default announcement
    pub fn new() -> Self {
        Self::default()
    }

    /// Post `message` instead
    pub fn message(&mut self, message: impl Into<String>) -> &mut Self {
        self.message = Some(message.into());
        self
    }

    /// Registry factory
    pub fn from_args(args: &StepArgs) -> Result<Box<dyn Step>> {
        let mut step = Self::new();
        if !args.is_empty() {
            step.message(args.all().join(" "));
        }
        Ok(Box::new(step))
    }
}

impl Step for PublishNotify {
    fn kind(&self) -> &'static str {
        Self::KIND
    }

    fn describe(&self) -> String {
        "announce release".to_string()
    }

    fn prepare(&mut self, ctx: &mut StepContext) -> Result<()> {
        ctx.feed()?.authenticate()?;
        Ok(())
    }

    fn run(&mut self, ctx: &mut StepContext) -> Result<()> {
        let message = match &self.message {
            Some(message) => message.clone(),
            None => ctx.release.release_info().announcement(),
        };
        let feed = ctx.feed()?;
        feed.post_status(&message)?;
        info!(service = feed.service(), "posted announcement");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::steps::test_support::{config, context, FakeFeed};
    use shipit_core::ShipitError;
    use shipit_publish::PublishError;
    use std::sync::Arc;

    #[test]
    fn test_posts_default_announcement() {
        let feed = Arc::new(FakeFeed::default());
        let mut ctx = context("/tmp", config("1.2.4"), Arc::default()).with_feed(feed.clone());

        let mut step = PublishNotify::new();
        step.prepare(&mut ctx).unwrap();
        assert!(feed.posts().is_empty());
        step.run(&mut ctx).unwrap();
        assert_eq!(feed.posts(), vec!["Released demo 1.2.4 (a demo)"]);
    }

    #[test]
    fn test_custom_message() {
        let feed = Arc::new(FakeFeed::default());
        let mut ctx = context("/tmp", config("1.2.4"), Arc::default()).with_feed(feed.clone());

        let mut step = PublishNotify::from_args(&StepArgs::from(["new", "build"])).unwrap();
        step.run(&mut ctx).unwrap();
        assert_eq!(feed.posts(), vec!["new build"]);
    }

    #[test]
    fn test_bad_credentials_fail_prepare() {
        let feed = Arc::new(FakeFeed {
            reject: true,
            ..Default::default()
        });
        let mut ctx = context("/tmp", config("1.2.4"), Arc::default()).with_feed(feed);

        let err = PublishNotify::new().prepare(&mut ctx).unwrap_err();
        assert!(matches!(
            err,
            ShipitError::Publish(PublishError::AuthenticationFailed { .. })
        ));
    }
}
