//! Style applicability conditions.

use crate::model::{ItemKind, ItemRef, Node};
use std::fmt;
use std::sync::Arc;

/// Predicate over a document item.
pub type Predicate = Arc<dyn Fn(ItemRef<'_>) -> bool + Send + Sync>;

/// Decides whether a style applies to an item: an optional predicate and
/// the item kind the condition is declared for.
///
/// An item matches when the predicate passes (a missing predicate always
/// passes) and the item's runtime kind is assignable from the declared
/// kind. Note the direction: a condition declared for [`ItemKind::QueryTable`]
/// matches a plain [`ItemKind::Table`], but one declared for `Table` does
/// not match a `QueryTable`.
#[derive(Clone)]
pub struct StyleCondition {
    declared: ItemKind,
    predicate: Option<Predicate>,
}

impl StyleCondition {
    /// Condition with a predicate over type-erased items.
    pub fn new<F>(declared: ItemKind, predicate: F) -> Self
    where
        F: Fn(ItemRef<'_>) -> bool + Send + Sync + 'static,
    {
        Self {
            declared,
            predicate: Some(Arc::new(predicate)),
        }
    }

    /// Condition with no predicate: only the kind check applies.
    pub fn of_kind(declared: ItemKind) -> Self {
        Self {
            declared,
            predicate: None,
        }
    }

    /// Typed condition: declared for `T::KIND`, and the predicate sees the
    /// concrete node. Items of other node types fail the predicate.
    pub fn when<T, F>(predicate: F) -> Self
    where
        T: Node + 'static,
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Self::new(T::KIND, move |item| T::from_item(item).is_some_and(&predicate))
    }

    pub fn declared_kind(&self) -> ItemKind {
        self.declared
    }

    pub fn has_predicate(&self) -> bool {
        self.predicate.is_some()
    }

    /// Evaluate only the predicate; vacuously true without one.
    pub fn test(&self, item: ItemRef<'_>) -> bool {
        self.predicate.as_ref().map_or(true, |p| p(item))
    }

    /// Logical negation of the predicate, same declared kind.
    pub fn negate(&self) -> Self {
        let predicate: Predicate = match &self.predicate {
            Some(p) => {
                let p = Arc::clone(p);
                Arc::new(move |item: ItemRef<'_>| !p(item))
            }
            None => Arc::new(|_: ItemRef<'_>| false),
        };
        Self {
            declared: self.declared,
            predicate: Some(predicate),
        }
    }

    /// Full match: predicate plus kind assignability.
    pub fn matches(&self, item: ItemRef<'_>) -> bool {
        self.test(item) && item.kind().is_assignable_from(self.declared)
    }
}

impl fmt::Debug for StyleCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StyleCondition")
            .field("declared", &self.declared)
            .field("predicate", &self.predicate.as_ref().map(|_| "<fn>"))
            .finish()
    }
}
