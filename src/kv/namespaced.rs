//! Key-prefixing store wrapper
//!
//! Lets several indexes share one physical store without key collisions:
//! every key is written as `<namespace>:<key>`.

use super::errors::KvResult;
use super::KvStore;

#[derive(Debug)]
pub struct Namespaced<S> {
    inner: S,
    prefix: String,
}

impl<S: KvStore> Namespaced<S> {
    /// Wrap `inner`. An empty namespace leaves keys untouched.
    pub fn new(inner: S, namespace: &str) -> Self {
        let prefix = if namespace.is_empty() {
            String::new()
        } else {
            format!("{}:", namespace)
        };
        Self { inner, prefix }
    }

    fn physical(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut S {
        &mut self.inner
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: KvStore> KvStore for Namespaced<S> {
    fn get(&self, key: &str) -> KvResult<Option<String>> {
        self.inner.get(&self.physical(key))
    }

    fn put(&mut self, key: &str, value: &str) -> KvResult<()> {
        let physical = self.physical(key);
        self.inner.put(&physical, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryKvStore;

    #[test]
    fn test_keys_are_prefixed() {
        let mut store = Namespaced::new(MemoryKvStore::new(), "LL");
        store.put("VW:a:1", "x").unwrap();

        assert_eq!(store.get("VW:a:1").unwrap().as_deref(), Some("x"));
        assert_eq!(store.inner().get("LL:VW:a:1").unwrap().as_deref(), Some("x"));
        assert_eq!(store.inner().get("VW:a:1").unwrap(), None);
    }

    #[test]
    fn test_namespaces_do_not_collide() {
        let mut ll = Namespaced::new(MemoryKvStore::new(), "LL");
        ll.put("k", "ll").unwrap();

        let mut fsl = Namespaced::new(ll.into_inner(), "FSL");
        fsl.put("k", "fsl").unwrap();

        let shared = fsl.into_inner();
        assert_eq!(shared.get("LL:k").unwrap().as_deref(), Some("ll"));
        assert_eq!(shared.get("FSL:k").unwrap().as_deref(), Some("fsl"));
    }

    #[test]
    fn test_empty_namespace_is_identity() {
        let mut store = Namespaced::new(MemoryKvStore::new(), "");
        store.put("k", "v").unwrap();
        assert_eq!(store.inner().get("k").unwrap().as_deref(), Some("v"));
    }
}
