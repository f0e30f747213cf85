use std::collections::HashMap;
use serde::{Serialize, Deserialize};
use crate::core::error::{Error, ErrorKind, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FieldId(pub u16);

/// Field name <-> `FieldId`. Ids follow first appearance during ingestion,
/// which also makes them the attribute rank used by ranking.
#[derive(Debug, Clone, Default)]
pub struct FieldsMap {
    names: Vec<String>,
    ids: HashMap<String, FieldId>,
}

impl FieldsMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str) -> Result<FieldId> {
        if let Some(id) = self.ids.get(name) {
            return Ok(*id);
        }
        let id = u16::try_from(self.names.len())
            .map(FieldId)
            .map_err(|_| Error::new(ErrorKind::Internal, format!("too many fields, cannot register `{}`", name)))?;
        self.names.push(name.to_string());
        self.ids.insert(name.to_string(), id);
        Ok(id)
    }

    pub fn id(&self, name: &str) -> Option<FieldId> {
        self.ids.get(name).copied()
    }

    pub fn name(&self, id: FieldId) -> Option<&str> {
        self.names.get(id.0 as usize).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (FieldId, &str)> {
        self.names.iter().enumerate().map(|(i, n)| (FieldId(i as u16), n.as_str()))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_follow_first_appearance() {
        let mut fields = FieldsMap::new();
        assert_eq!(fields.insert("objectId").unwrap(), FieldId(0));
        assert_eq!(fields.insert("title").unwrap(), FieldId(1));
        assert_eq!(fields.insert("objectId").unwrap(), FieldId(0));
        assert_eq!(fields.name(FieldId(1)), Some("title"));
        assert_eq!(fields.id("genre"), None);
        assert_eq!(fields.len(), 2);
    }
}
