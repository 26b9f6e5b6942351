//! structural resolution of untagged unions.
//!
//! given a JSON value and an ordered list of [`Candidate`]s, pick the one the
//! value most plausibly is. Scalars are coerced, arrays are inferred from their
//! first element, and objects are ranked by field-name overlap:
//!
//! ```text
//! overlap = matched
//! penalty = missing + extra
//! ```
//!
//! where `matched` counts declared fields present with a compatible value,
//! `missing` counts declared fields absent from the object, and `extra` counts
//! properties the shape doesn't declare (or declares with an incompatible kind).
//! The largest overlap wins, a smaller penalty breaks ties, and remaining ties
//! go to the candidate declared first. A shape must overlap at least one field.

use std::cmp::Reverse;

use serde_json::{Map, Value};
use tracing::trace;

use crate::resolve::error::{ResolveError, ResolveResult};
use crate::resolve::scalar::Scalar;
use crate::resolve::shape::{Candidate, ShapeDef};

/// Outcome of resolving one value. Candidate indices refer to the slice passed in.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved {
    Null,
    /// a scalar, with the candidate that holds it if any does
    Scalar { candidate: Option<usize>, value: Scalar },
    /// the best-ranked object shape
    Object { candidate: usize, overlap: usize },
    /// a list bound to a list candidate, or untyped when none accepts the first element
    List { candidate: Option<usize>, items: Vec<Resolved> },
}

impl Resolved {
    pub fn candidate(&self) -> Option<usize> {
        match self {
            Resolved::Null => None,
            Resolved::Scalar { candidate, .. } | Resolved::List { candidate, .. } => *candidate,
            Resolved::Object { candidate, .. } => Some(*candidate),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Resolved::Null)
    }
}

/// How well an object fits one shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeScore {
    /// index into the candidate list
    pub candidate: usize,
    pub name: &'static str,
    /// declared fields present with a compatible value
    pub matched: usize,
    pub missing: usize,
    pub extra: usize,
}

impl ShapeScore {
    /// missing plus extra properties, used to break overlap ties
    pub fn penalty(&self) -> usize {
        self.missing + self.extra
    }
}

/// The structural matcher. Field names compare case-insensitively unless
/// configured otherwise.
#[derive(Debug, Clone, Copy, Default)]
pub struct Resolver {
    case_sensitive: bool,
}

impl Resolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn case_sensitive(mut self, yes: bool) -> Self {
        self.case_sensitive = yes;
        self
    }

    fn same_name(&self, a: &str, b: &str) -> bool {
        if self.case_sensitive {
            a == b
        } else {
            a.eq_ignore_ascii_case(b)
        }
    }

    /// resolve `value` against `candidates`
    pub fn resolve(&self, value: &Value, candidates: &[Candidate]) -> Resolved {
        match value {
            Value::Null => Resolved::Null,
            Value::Array(items) => self.resolve_list(items, candidates),
            Value::Object(object) => match self.best(object, candidates) {
                Some(best) => Resolved::Object {
                    candidate: best.candidate,
                    overlap: best.matched,
                },
                None => Resolved::Null,
            },
            scalar => match Scalar::coerce(scalar) {
                Some(natural) => self.bind_scalar(natural, candidates),
                None => Resolved::Null,
            },
        }
    }

    /// like [`Resolver::resolve`], but failing when no candidate takes the value
    /// or when a list's elements disagree with the type its first element chose
    pub fn choose(&self, value: &Value, candidates: &[Candidate]) -> ResolveResult<usize> {
        let resolved = self.resolve(value, candidates);
        let index = resolved.candidate().ok_or_else(|| ResolveError::no_match(candidates))?;

        if let (Resolved::List { items, .. }, Some(Candidate::List(element))) = (&resolved, candidates.get(index)) {
            let first = items.first().and_then(Resolved::candidate);
            if let Some(position) = items.iter().position(|item| !item.is_null() && item.candidate() != first) {
                return Err(ResolveError::MixedList {
                    position,
                    element: element.name(),
                });
            }
        }
        Ok(index)
    }

    /// [`Resolver::choose`], then rename the value's keys to the chosen
    /// candidate's declared spelling so it can be populated
    pub fn choose_aligned(&self, value: Value, candidates: &[Candidate]) -> ResolveResult<(usize, Value)> {
        let index = self.choose(&value, candidates)?;
        let aligned = match candidates.get(index) {
            Some(candidate) => self.align_keys(value, candidate),
            None => value,
        };
        Ok((index, aligned))
    }

    /// rename object keys that match a declared field under this resolver's
    /// name comparison to the declared spelling. Lists are aligned per element.
    pub fn align_keys(&self, value: Value, candidate: &Candidate) -> Value {
        match (value, candidate) {
            (Value::Object(object), Candidate::Object(shape)) => Value::Object(self.align_object(&object, shape)),
            (Value::Array(items), Candidate::List(element)) => {
                Value::Array(items.into_iter().map(|item| self.align_keys(item, element)).collect())
            }
            (value, _) => value,
        }
    }

    fn align_object(&self, object: &Map<String, Value>, shape: &ShapeDef) -> Map<String, Value> {
        object
            .iter()
            .map(|(key, value)| {
                // an exact spelling already present wins over a case variant
                let declared = shape
                    .fields
                    .iter()
                    .map(|field| field.name)
                    .find(|name| self.same_name(key, name))
                    .filter(|name| *name != key.as_str() && !object.contains_key(*name));
                (declared.map_or_else(|| key.clone(), str::to_string), value.clone())
            })
            .collect()
    }

    /// score every object candidate, best first; full ties keep declaration order
    pub fn rank(&self, object: &Map<String, Value>, candidates: &[Candidate]) -> Vec<ShapeScore> {
        let mut scores: Vec<ShapeScore> = candidates
            .iter()
            .enumerate()
            .filter_map(|(index, candidate)| match candidate {
                Candidate::Object(shape) => Some(self.score(index, shape, object)),
                _ => None,
            })
            .collect();

        // stable, so full ties stay in declaration order
        scores.sort_by_key(|s| (Reverse(s.matched), s.penalty()));
        scores
    }

    fn best(&self, object: &Map<String, Value>, candidates: &[Candidate]) -> Option<ShapeScore> {
        let ranked = self.rank(object, candidates);
        trace!(
            ranked = ?ranked.iter().map(|s| (s.name, s.matched, s.penalty())).collect::<Vec<_>>(),
            "ranked object shapes"
        );
        ranked.into_iter().next().filter(|best| best.matched > 0)
    }

    fn score(&self, candidate: usize, shape: &ShapeDef, object: &Map<String, Value>) -> ShapeScore {
        let mut matched = 0;
        let mut mismatched = 0;
        let mut missing = 0;

        for field in shape.fields {
            match object.iter().find(|(key, _)| self.same_name(key, field.name)) {
                Some((_, value)) if field.kind.accepts(value) => matched += 1,
                Some(_) => mismatched += 1,
                None => missing += 1,
            }
        }

        let undeclared = object
            .keys()
            .filter(|key| !shape.fields.iter().any(|f| self.same_name(key, f.name)))
            .count();
        ShapeScore {
            candidate,
            name: shape.name,
            matched,
            missing,
            extra: undeclared + mismatched,
        }
    }

    /// pick the scalar candidate of the exact natural kind, else one that widens it
    fn bind_scalar(&self, natural: Scalar, candidates: &[Candidate]) -> Resolved {
        let kind = natural.kind();
        let scalar_kinds = || {
            candidates.iter().enumerate().filter_map(|(i, c)| match c {
                Candidate::Scalar(k) => Some((i, *k)),
                _ => None,
            })
        };

        let chosen = scalar_kinds()
            .find(|(_, k)| *k == kind)
            .or_else(|| scalar_kinds().find(|(_, k)| k.widens(kind)));

        match chosen {
            Some((index, target)) => match natural.clone().convert(target) {
                Some(value) => Resolved::Scalar {
                    candidate: Some(index),
                    value,
                },
                None => Resolved::Scalar {
                    candidate: None,
                    value: natural,
                },
            },
            None => Resolved::Scalar {
                candidate: None,
                value: natural,
            },
        }
    }

    fn resolve_list(&self, items: &[Value], candidates: &[Candidate]) -> Resolved {
        // (index in `candidates`, element candidate) for every list candidate
        let lists: Vec<(usize, Candidate)> = candidates
            .iter()
            .enumerate()
            .filter_map(|(i, c)| match c {
                Candidate::List(element) => Some((i, (**element).clone())),
                _ => None,
            })
            .collect();

        let Some(first) = items.first() else {
            return Resolved::List {
                candidate: lists.first().map(|(i, _)| *i),
                items: Vec::new(),
            };
        };

        let elements: Vec<Candidate> = lists.iter().map(|(_, e)| e.clone()).collect();
        let resolved: Vec<Resolved> = items.iter().map(|item| self.resolve(item, &elements)).collect();

        // the first element decides the element type of the whole list
        let candidate = match self.resolve(first, &elements).candidate() {
            Some(element) => lists.get(element).map(|(i, _)| *i),
            None => None,
        };

        Resolved::List {
            candidate,
            items: resolved,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::scalar::ScalarKind;
    use crate::resolve::shape::FieldDef;
    use chrono::NaiveDate;
    use serde_json::json;

    const NAMED: &[FieldDef] = &[FieldDef::value("name")];
    const NUMBERED: &[FieldDef] = &[FieldDef::value("name"), FieldDef::value("number")];
    const FOO: &[FieldDef] = &[FieldDef::value("Foo")];
    const BAR: &[FieldDef] = &[FieldDef::value("Bar")];

    fn named_shapes() -> Vec<Candidate> {
        vec![
            Candidate::Object(ShapeDef::new("Named", NAMED)),
            Candidate::Object(ShapeDef::new("Numbered", NUMBERED)),
        ]
    }

    #[test]
    fn test_null_resolves_to_null() {
        assert!(Resolver::new().resolve(&json!(null), &named_shapes()).is_null());
    }

    #[test]
    fn test_scalar_bypasses_shape_scoring() {
        let candidates = vec![
            Candidate::Scalar(ScalarKind::Date),
            Candidate::Scalar(ScalarKind::String),
            Candidate::Object(ShapeDef::new("Named", NAMED)),
        ];
        let resolved = Resolver::new().resolve(&json!("2024-01-01"), &candidates);
        assert_eq!(
            resolved,
            Resolved::Scalar {
                candidate: Some(0),
                value: Scalar::Date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()),
            }
        );
    }

    #[test]
    fn test_scalar_prefers_exact_kind_then_widening() {
        let resolver = Resolver::new();
        let string_first = vec![Candidate::Scalar(ScalarKind::String), Candidate::Scalar(ScalarKind::Date)];
        assert_eq!(resolver.resolve(&json!("2024-01-01"), &string_first).candidate(), Some(1));

        let string_only = vec![Candidate::Scalar(ScalarKind::String)];
        assert_eq!(
            resolver.resolve(&json!("2024-01-01"), &string_only),
            Resolved::Scalar {
                candidate: Some(0),
                value: Scalar::String("2024-01-01".into()),
            }
        );

        let float_only = vec![Candidate::Scalar(ScalarKind::Float)];
        assert_eq!(resolver.resolve(&json!(3), &float_only).candidate(), Some(0));

        let bool_only = vec![Candidate::Scalar(ScalarKind::Bool)];
        let unbound = resolver.resolve(&json!("x"), &bool_only);
        assert_eq!(unbound.candidate(), None);
        assert!(!unbound.is_null());
    }

    #[test]
    fn test_object_exact_match_beats_superset() {
        let resolver = Resolver::new();
        let candidates = named_shapes();

        assert_eq!(resolver.resolve(&json!({"name": "x"}), &candidates).candidate(), Some(0));
        assert_eq!(resolver.resolve(&json!({"name": "x", "number": 1}), &candidates).candidate(), Some(1));
    }

    #[test]
    fn test_sparse_object_matches_by_overlap() {
        const WIDE: &[FieldDef] = &[
            FieldDef::value("x"),
            FieldDef::value("y"),
            FieldDef::value("z"),
            FieldDef::value("w"),
        ];
        let candidates = vec![
            Candidate::Object(ShapeDef::new("Named", NAMED)),
            Candidate::Object(ShapeDef::new("Wide", WIDE)),
        ];
        let resolver = Resolver::new();

        assert_eq!(
            resolver.resolve(&json!({"x": 1}), &candidates),
            Resolved::Object {
                candidate: 1,
                overlap: 1,
            }
        );

        let ranked = resolver.rank(json!({"x": 1}).as_object().unwrap(), &candidates);
        assert_eq!(ranked[0].name, "Wide");
        assert_eq!((ranked[0].matched, ranked[0].missing), (1, 3));
        assert_eq!(ranked[1].matched, 0);
    }

    #[test]
    fn test_penalty_breaks_overlap_ties() {
        let candidates = vec![
            Candidate::Object(ShapeDef::new("Numbered", NUMBERED)),
            Candidate::Object(ShapeDef::new("Named", NAMED)),
        ];
        let ranked = Resolver::new().rank(json!({"name": "x"}).as_object().unwrap(), &candidates);

        assert_eq!(ranked[0].name, "Named");
        assert_eq!(ranked[1].penalty(), 1);
    }

    #[test]
    fn test_object_disjoint_shapes() {
        let candidates = vec![
            Candidate::Object(ShapeDef::new("Type1", FOO)),
            Candidate::Object(ShapeDef::new("Type2", BAR)),
        ];
        let resolver = Resolver::new();

        assert_eq!(resolver.resolve(&json!({"Foo": 12}), &candidates).candidate(), Some(0));
        assert_eq!(resolver.resolve(&json!({"bar": 12}), &candidates).candidate(), Some(1));
        assert!(resolver.resolve(&json!({}), &candidates).is_null());
        assert!(resolver.resolve(&json!({"Baz": 1}), &candidates).is_null());
    }

    #[test]
    fn test_case_sensitivity_is_configurable() {
        let candidates = vec![Candidate::Object(ShapeDef::new("Type1", FOO))];
        let strict = Resolver::new().case_sensitive(true);

        assert!(strict.resolve(&json!({"foo": 1}), &candidates).is_null());
        assert_eq!(strict.resolve(&json!({"Foo": 1}), &candidates).candidate(), Some(0));
    }

    #[test]
    fn test_kind_mismatch_does_not_count() {
        const TYPED: &[FieldDef] = &[FieldDef::object("name")];
        let candidates = vec![
            Candidate::Object(ShapeDef::new("Typed", TYPED)),
            Candidate::Object(ShapeDef::new("Named", NAMED)),
        ];
        let ranked = Resolver::new().rank(json!({"name": "x"}).as_object().unwrap(), &candidates);

        assert_eq!(ranked[0].name, "Named");
        assert_eq!(ranked[1].matched, 0);
        assert_eq!(ranked[1].extra, 1);
    }

    #[test]
    fn test_ties_keep_declaration_order() {
        const ALSO_NAMED: &[FieldDef] = &[FieldDef::value("name")];
        let candidates = vec![
            Candidate::Object(ShapeDef::new("First", NAMED)),
            Candidate::Object(ShapeDef::new("Second", ALSO_NAMED)),
        ];
        let resolver = Resolver::new();
        let ranked = resolver.rank(json!({"name": "x"}).as_object().unwrap(), &candidates);

        assert_eq!((ranked[0].matched, ranked[0].penalty()), (ranked[1].matched, ranked[1].penalty()));
        assert_eq!(ranked[0].name, "First");
        assert_eq!(resolver.resolve(&json!({"name": "x"}), &candidates).candidate(), Some(0));

        let reversed: Vec<Candidate> = candidates.into_iter().rev().collect();
        assert_eq!(resolver.resolve(&json!({"name": "x"}), &reversed).candidate(), Some(0));
        assert_eq!(resolver.rank(json!({"name": "x"}).as_object().unwrap(), &reversed)[0].name, "Second");
    }

    #[test]
    fn test_empty_array_takes_first_list_candidate() {
        let candidates = vec![
            Candidate::Scalar(ScalarKind::String),
            Candidate::list_of(Candidate::Scalar(ScalarKind::Integer)),
            Candidate::list_of(Candidate::Object(ShapeDef::new("Named", NAMED))),
        ];
        let resolved = Resolver::new().resolve(&json!([]), &candidates);

        assert_eq!(
            resolved,
            Resolved::List {
                candidate: Some(1),
                items: vec![],
            }
        );
        assert!(!Resolver::new().resolve(&json!([]), &[]).is_null());
    }

    #[test]
    fn test_array_element_type_from_first_element() {
        let candidates = vec![
            Candidate::list_of(Candidate::Scalar(ScalarKind::Integer)),
            Candidate::list_of(Candidate::Object(ShapeDef::new("Named", NAMED))),
        ];
        let resolver = Resolver::new();

        let objects = resolver.resolve(&json!([{"name": "a"}, {"name": "b"}]), &candidates);
        assert_eq!(objects.candidate(), Some(1));

        let numbers = resolver.resolve(&json!([1, 2, 3]), &candidates);
        let Resolved::List { candidate, items } = numbers else {
            panic!("expected a list");
        };
        assert_eq!(candidate, Some(0));
        assert_eq!(items.len(), 3);
    }

    #[test]
    fn test_array_without_accepting_candidate_stays_untyped() {
        let candidates = vec![Candidate::list_of(Candidate::Scalar(ScalarKind::Bool))];
        let resolved = Resolver::new().resolve(&json!([{"name": "a"}]), &candidates);

        assert_eq!(
            resolved,
            Resolved::List {
                candidate: None,
                items: vec![Resolved::Null],
            }
        );
    }

    #[test]
    fn test_align_keys_uses_declared_spelling() {
        const CAPITALIZED: &[FieldDef] = &[FieldDef::value("Name"), FieldDef::value("Number")];
        let candidate = Candidate::Object(ShapeDef::new("Numbered", CAPITALIZED));
        let resolver = Resolver::new();

        let aligned = resolver.align_keys(json!({"name": "x", "NUMBER": 12, "other": true}), &candidate);
        assert_eq!(aligned, json!({"Name": "x", "Number": 12, "other": true}));

        // an exact match is never overwritten by a case variant
        let both = resolver.align_keys(json!({"name": "lower", "Name": "exact"}), &candidate);
        assert_eq!(both, json!({"name": "lower", "Name": "exact"}));

        let strict = Resolver::new().case_sensitive(true);
        assert_eq!(strict.align_keys(json!({"name": "x"}), &candidate), json!({"name": "x"}));
    }

    #[test]
    fn test_align_keys_in_lists() {
        let candidate = Candidate::list_of(Candidate::Object(ShapeDef::new("Type1", FOO)));
        let aligned = Resolver::new().align_keys(json!([{"foo": 1}, {"FOO": 2}]), &candidate);
        assert_eq!(aligned, json!([{"Foo": 1}, {"Foo": 2}]));
    }

    #[test]
    fn test_choose_rejects_mixed_lists() {
        let candidates = vec![
            Candidate::list_of(Candidate::Scalar(ScalarKind::Integer)),
            Candidate::list_of(Candidate::Object(ShapeDef::new("Named", NAMED))),
        ];
        let err = Resolver::new().choose(&json!([1, {"name": "a"}]), &candidates).unwrap_err();

        assert!(matches!(&err, ResolveError::MixedList { position: 1, element } if element == "integer"));
        assert_eq!(Resolver::new().choose(&json!([1, 2]), &candidates).unwrap(), 0);
    }

    #[test]
    fn test_choose_reports_candidates() {
        let err = Resolver::new().choose(&json!({"zzz": 1}), &named_shapes()).unwrap_err();
        assert!(err.to_string().contains("Named, Numbered"));
    }
}
