use std::collections::HashMap;

use eyre::{bail, Result};

use super::{ChannelHandle, MethodCallHandler};

/// Channels by name, at most one handler each.
#[derive(Debug, Clone, Default)]
pub struct ChannelRegistry {
    channels: HashMap<String, ChannelHandle>,
}

impl ChannelRegistry {
    pub fn register<H: MethodCallHandler>(&mut self, name: &str, handler: H) -> Result<ChannelHandle> {
        if self.channels.contains_key(name) {
            bail!("a handler is already registered for channel {}", name);
        }
        let handle = ChannelHandle::new(name, handler);
        self.channels.insert(name.to_owned(), handle.clone());
        Ok(handle)
    }

    pub fn get(&self, name: &str) -> Option<&ChannelHandle> {
        self.channels.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.channels.keys().map(|name| name.as_str())
    }
}

#[cfg(test)]
mod test {
    use async_trait::async_trait;
    use claims::{assert_err, assert_none, assert_ok, assert_some};

    use super::*;
    use crate::channel::{MethodCall, MethodResponse};

    struct Nothing;

    #[async_trait]
    impl MethodCallHandler for Nothing {
        async fn handle(&self, _call: MethodCall) -> MethodResponse {
            MethodResponse::NotImplemented
        }
    }

    #[tokio::test]
    async fn one_handler_per_channel() {
        let mut registry = ChannelRegistry::default();
        assert_ok!(registry.register("first", Nothing));
        assert_ok!(registry.register("second", Nothing));
        assert_err!(registry.register("first", Nothing));

        let first = assert_some!(registry.get("first"));
        assert_eq!(first.name(), "first");
        assert_none!(registry.get("third"));

        let mut names: Vec<_> = registry.names().collect();
        names.sort();
        assert_eq!(names, vec!["first", "second"]);
    }
}
