use super::{
    ComponentSetResult, DefinitionResult, DictionaryResult, FieldEntry, ResultNode, ScalarResult,
    SequenceResult,
};
use crate::error::MergeError;
use crate::schema::InheritancePolicy;

impl ResultNode {
    /// Merges `self` (the child) over `parent` and returns a new tree.
    ///
    /// - Scalars: the child wins.
    /// - Definitions: a mapped child field is kept, or merged recursively
    ///   over the parent's when its policy is [`InheritancePolicy::Always`],
    ///   or when it is an included field not marked `Never`.
    ///   An unmapped child field takes the parent's entry, unless its policy
    ///   is [`InheritancePolicy::Never`].
    /// - Arrays and collections: parent elements, then child elements.
    /// - Dictionaries: child entries, then parent entries whose key the
    ///   child does not have.
    /// - Component sets: child entries; a parent entry of the same kind is
    ///   merged under the child's, a parent entry whose kind shares a
    ///   capability marker with a child entry is dropped, any other is added.
    ///
    /// Neither input is modified.
    ///
    /// # Errors
    ///
    /// Fails if the two trees disagree in shape, type or field count.
    #[inline]
    pub fn push_inheritance_from(&self, parent: &ResultNode) -> Result<ResultNode, MergeError> {
        self.push_inheritance_with(parent, true)
    }

    /// Like [`push_inheritance_from`](Self::push_inheritance_from), running
    /// `after_deserialization` on rebuilt definitions only if `run_hooks`.
    pub fn push_inheritance_with(
        &self,
        parent: &ResultNode,
        run_hooks: bool,
    ) -> Result<ResultNode, MergeError> {
        match (self, parent) {
            (Self::Scalar(child), Self::Scalar(parent)) => {
                check_types(&*child.value, &*parent.value)?;
                Ok(Self::Scalar(ScalarResult::new(child.value.clone())))
            }
            (Self::Array(child), Self::Array(parent)) => child.append_to(parent).map(Self::Array),
            (Self::Collection(child), Self::Collection(parent)) => {
                child.append_to(parent).map(Self::Collection)
            }
            (Self::Dictionary(child), Self::Dictionary(parent)) => {
                child.merge_over(parent).map(Self::Dictionary)
            }
            (Self::Definition(child), Self::Definition(parent)) => {
                child.merge_over(parent, run_hooks).map(Self::Definition)
            }
            (Self::ComponentSet(child), Self::ComponentSet(parent)) => {
                child.merge_over(parent, run_hooks).map(Self::ComponentSet)
            }
            _ => Err(MergeError::KindMismatch {
                child: self.kind(),
                parent: parent.kind(),
            }),
        }
    }
}

fn check_types(child: &dyn crate::Value, parent: &dyn crate::Value) -> Result<(), MergeError> {
    if child.value_type_id() == parent.value_type_id() {
        Ok(())
    } else {
        Err(MergeError::TypeMismatch {
            child: child.value_type_path(),
            parent: parent.value_type_path(),
        })
    }
}

impl SequenceResult {
    fn append_to(&self, parent: &SequenceResult) -> Result<SequenceResult, MergeError> {
        check_types(&*self.value, &*parent.value)?;
        let mut elements: Vec<ResultNode> = Vec::with_capacity(parent.elements.len() + self.elements.len());
        for element in parent.elements.iter().chain(&self.elements) {
            if self.unique
                && elements
                    .iter()
                    .any(|seen| seen.value().value_eq(element.value()))
            {
                continue;
            }
            elements.push(element.clone());
        }
        let value = (self.rebuild)(&elements)?;
        Ok(SequenceResult::new(value, elements, self.rebuild).with_unique(self.unique))
    }
}

impl DictionaryResult {
    fn merge_over(&self, parent: &DictionaryResult) -> Result<DictionaryResult, MergeError> {
        check_types(&*self.value, &*parent.value)?;
        let mut entries = self.entries.clone();
        for (key, value) in &parent.entries {
            let shadowed = self
                .entries
                .iter()
                .any(|(own, _)| own.value().value_eq(key.value()));
            if !shadowed {
                entries.push((key.clone(), value.clone()));
            }
        }
        let value = (self.rebuild)(&entries)?;
        Ok(DictionaryResult::new(value, entries, self.rebuild))
    }
}

impl DefinitionResult {
    fn merge_over(
        &self,
        parent: &DefinitionResult,
        run_hooks: bool,
    ) -> Result<DefinitionResult, MergeError> {
        if self.schema.type_id() != parent.schema.type_id() {
            return Err(MergeError::TypeMismatch {
                child: self.schema.type_path(),
                parent: parent.schema.type_path(),
            });
        }
        if self.fields.len() != parent.fields.len() {
            return Err(MergeError::FieldCountMismatch {
                type_path: self.schema.type_path(),
                child: self.fields.len(),
                parent: parent.fields.len(),
            });
        }

        log::trace!("merging `{}` over its parent", self.schema.type_path());

        let mut fields = Vec::with_capacity(self.fields.len());
        let schema_fields = self.schema.fields();
        for (index, (child, parent)) in self.fields.iter().zip(&parent.fields).enumerate() {
            // Included keys live in the enclosing mapping, so they inherit
            // one by one like the enclosing definition's own fields.
            let included = schema_fields
                .get(index)
                .is_some_and(|field| field.tag().is_none());
            let recurse = match child.inheritance {
                InheritancePolicy::Always => true,
                InheritancePolicy::Default => included,
                InheritancePolicy::Never => false,
            };
            let entry = if child.mapped {
                match (&child.result, &parent.result) {
                    (Some(own), Some(inherited)) if recurse => FieldEntry::mapped(
                        child.inheritance,
                        own.push_inheritance_with(inherited, run_hooks)?,
                    ),
                    _ => child.clone(),
                }
            } else if child.inheritance == InheritancePolicy::Never {
                child.clone()
            } else {
                parent.clone()
            };
            fields.push(entry);
        }

        let value = self.schema.instantiate_from(&fields, run_hooks)?;
        Ok(DefinitionResult::new(value, self.schema.clone(), fields))
    }
}

impl ComponentSetResult {
    fn merge_over(
        &self,
        parent: &ComponentSetResult,
        run_hooks: bool,
    ) -> Result<ComponentSetResult, MergeError> {
        let own = self.entries.len();
        let mut entries = self.entries.clone();
        for inherited in &parent.entries {
            if let Some(index) = entries[..own]
                .iter()
                .position(|entry| entry.kind == inherited.kind)
            {
                let merged = entries[index]
                    .result
                    .push_inheritance_with(&inherited.result, run_hooks)?;
                entries[index].result = merged;
                continue;
            }
            if entries[..own]
                .iter()
                .any(|entry| entry.conflicts_with(inherited))
            {
                continue;
            }
            entries.push(inherited.clone());
        }
        Ok(ComponentSetResult::from_entries(entries))
    }
}

#[cfg(test)]
mod tests {
    use alloc::collections::BTreeMap;

    use crate::error::MergeError;
    use crate::node::DataNode;
    use crate::result::ResultNode;
    use crate::{SerializationManager, codec::Decoded};

    fn read<T: crate::DataType>(manager: &SerializationManager, json: &str) -> Decoded<T> {
        let node: DataNode = serde_json::from_str(json).unwrap();
        manager.read::<T>(&node, None).unwrap()
    }

    #[test]
    fn scalar_child_wins() {
        let manager = SerializationManager::default();
        let child = read::<i32>(&manager, "1").result;
        let parent = read::<i32>(&manager, "2").result;
        let merged = child.push_inheritance_from(&parent).unwrap();
        assert_eq!(merged.take::<i32>(), Ok(1));
    }

    #[test]
    fn array_appends_after_parent() {
        let manager = SerializationManager::default();
        let child = read::<Vec<i32>>(&manager, "[3, 4]").result;
        let parent = read::<Vec<i32>>(&manager, "[1, 2]").result;
        let merged = child.push_inheritance_from(&parent).unwrap();
        assert_eq!(merged.elements().map(<[_]>::len), Some(4));
        assert_eq!(merged.take::<Vec<i32>>(), Ok(vec![1, 2, 3, 4]));
    }

    #[test]
    fn dictionary_child_shadows() {
        let manager = SerializationManager::default();
        let child = read::<BTreeMap<String, i32>>(&manager, r#"{"a": 1}"#).result;
        let parent = read::<BTreeMap<String, i32>>(&manager, r#"{"a": 2, "b": 3}"#).result;
        let merged = child.push_inheritance_from(&parent).unwrap();
        let expected = BTreeMap::from([("a".to_owned(), 1), ("b".to_owned(), 3)]);
        assert_eq!(merged.take::<BTreeMap<String, i32>>(), Ok(expected));
    }

    #[test]
    fn set_elements_stay_unique() {
        use alloc::collections::BTreeSet;

        let manager = SerializationManager::default();
        let repeated = read::<BTreeSet<i32>>(&manager, "[1, 1]").result;
        assert_eq!(repeated.elements().map(<[_]>::len), Some(1));

        let child = read::<BTreeSet<i32>>(&manager, "[2, 3]").result;
        let parent = read::<BTreeSet<i32>>(&manager, "[1, 2]").result;
        let merged = child.push_inheritance_from(&parent).unwrap();
        assert_eq!(merged.elements().map(<[_]>::len), Some(3));

        // Merging the result again adds nothing it already holds.
        let again = merged.push_inheritance_from(&parent).unwrap();
        assert_eq!(again.elements().map(<[_]>::len), Some(3));
        assert_eq!(again.take::<BTreeSet<i32>>(), Ok(BTreeSet::from([1, 2, 3])));
    }

    #[test]
    fn inputs_are_untouched() {
        let manager = SerializationManager::default();
        let child = read::<Vec<String>>(&manager, r#"["c"]"#).result;
        let parent = read::<Vec<String>>(&manager, r#"["p"]"#).result;
        let before = (child.clone(), parent.clone());
        let _ = child.push_inheritance_from(&parent).unwrap();
        let _ = child.push_inheritance_from(&parent).unwrap();
        assert_eq!((child, parent), before);
    }

    #[test]
    fn shape_mismatch_is_an_error() {
        let manager = SerializationManager::default();
        let list = read::<Vec<i32>>(&manager, "[1]").result;
        let scalar = read::<i32>(&manager, "1").result;
        assert_eq!(
            list.push_inheritance_from(&scalar),
            Err(MergeError::KindMismatch {
                child: "array",
                parent: "scalar"
            })
        );

        let other = read::<i64>(&manager, "1").result;
        assert!(matches!(
            scalar.push_inheritance_from(&other),
            Err(MergeError::TypeMismatch { .. })
        ));
        assert!(matches!(
            ResultNode::scalar(1_u8).push_inheritance_from(&ResultNode::scalar(2_u8)),
            Ok(_)
        ));
    }
}
