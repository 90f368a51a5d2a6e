//! Binding targets: where a matched option writes its arguments.
//!
//! A [`Binding`] is declared against a model type `T` and projected onto a
//! borrowed [`Target`] at dispatch time. Handlers only ever see the
//! projection, so a single [`HandlerRegistry`](crate::HandlerRegistry)
//! serves every model type, nested command models included.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::HandlerError;

/// Accessor for a field of the model.
pub type Slot<T, V> = fn(&mut T) -> &mut V;

pub type Converter<T> = Arc<dyn Fn(&mut T, &str) -> Result<(), HandlerError> + Send + Sync>;

pub type Action<T> = Arc<dyn Fn(&mut T) + Send + Sync>;

/// The kind of slot a binding writes to, used for handler resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetKind {
    Flag,
    Text,
    OptionalText,
    Integer,
    List,
    Map,
    Parsed,
    Action,
    Callback,
}

impl TargetKind {
    pub fn name(self) -> &'static str {
        match self {
            TargetKind::Flag => "flag",
            TargetKind::Text => "text",
            TargetKind::OptionalText => "optional text",
            TargetKind::Integer => "integer",
            TargetKind::List => "list",
            TargetKind::Map => "map",
            TargetKind::Parsed => "parsed value",
            TargetKind::Action => "action",
            TargetKind::Callback => "callback",
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub enum Binding<T> {
    Flag(Slot<T, bool>),
    Text(Slot<T, String>),
    OptionalText(Slot<T, Option<String>>),
    Integer(Slot<T, i64>),
    List(Slot<T, Vec<String>>),
    Map(Slot<T, BTreeMap<String, String>>),
    /// Converts the argument and stores it.
    Parsed(Converter<T>),
    /// Zero-argument callback.
    Action(Action<T>),
    /// One-argument callback.
    Callback(Converter<T>),
}

impl<T> Clone for Binding<T> {
    fn clone(&self) -> Self {
        match self {
            Binding::Flag(s) => Binding::Flag(*s),
            Binding::Text(s) => Binding::Text(*s),
            Binding::OptionalText(s) => Binding::OptionalText(*s),
            Binding::Integer(s) => Binding::Integer(*s),
            Binding::List(s) => Binding::List(*s),
            Binding::Map(s) => Binding::Map(*s),
            Binding::Parsed(f) => Binding::Parsed(Arc::clone(f)),
            Binding::Action(f) => Binding::Action(Arc::clone(f)),
            Binding::Callback(f) => Binding::Callback(Arc::clone(f)),
        }
    }
}

impl<T> fmt::Debug for Binding<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Binding::{:?}", self.kind())
    }
}

impl<T: 'static> Binding<T> {
    /// Store the argument converted with `FromStr`.
    pub fn parsed<V>(slot: Slot<T, V>) -> Self
    where
        V: FromStr + 'static,
        V::Err: fmt::Display,
    {
        Binding::Parsed(Arc::new(move |model: &mut T, arg: &str| -> Result<(), HandlerError> {
            *slot(model) = convert(arg)?;
            Ok(())
        }))
    }

    /// Like [`Binding::parsed`] for an `Option` field.
    pub fn parsed_opt<V>(slot: Slot<T, Option<V>>) -> Self
    where
        V: FromStr + 'static,
        V::Err: fmt::Display,
    {
        Binding::Parsed(Arc::new(move |model: &mut T, arg: &str| -> Result<(), HandlerError> {
            *slot(model) = Some(convert(arg)?);
            Ok(())
        }))
    }

    pub fn action<F>(f: F) -> Self
    where
        F: Fn(&mut T) + Send + Sync + 'static,
    {
        Binding::Action(Arc::new(f))
    }

    pub fn callback<F>(f: F) -> Self
    where
        F: Fn(&mut T, &str) -> Result<(), HandlerError> + Send + Sync + 'static,
    {
        Binding::Callback(Arc::new(f))
    }
}

fn convert<V>(arg: &str) -> Result<V, HandlerError>
where
    V: FromStr,
    V::Err: fmt::Display,
{
    arg.parse::<V>()
        .map_err(|e| HandlerError(format!("cannot convert '{}': {}", arg, e)))
}

impl<T> Binding<T> {
    pub fn kind(&self) -> TargetKind {
        match self {
            Binding::Flag(_) => TargetKind::Flag,
            Binding::Text(_) => TargetKind::Text,
            Binding::OptionalText(_) => TargetKind::OptionalText,
            Binding::Integer(_) => TargetKind::Integer,
            Binding::List(_) => TargetKind::List,
            Binding::Map(_) => TargetKind::Map,
            Binding::Parsed(_) => TargetKind::Parsed,
            Binding::Action(_) => TargetKind::Action,
            Binding::Callback(_) => TargetKind::Callback,
        }
    }

    /// Borrow the slot this binding names on `model`.
    pub fn project<'a>(&self, model: &'a mut T) -> Target<'a>
    where
        T: 'a,
    {
        match self {
            Binding::Flag(slot) => Target::Flag(slot(model)),
            Binding::Text(slot) => Target::Text(slot(model)),
            Binding::OptionalText(slot) => Target::OptionalText(slot(model)),
            Binding::Integer(slot) => Target::Integer(slot(model)),
            Binding::List(slot) => Target::List(slot(model)),
            Binding::Map(slot) => Target::Map(slot(model)),
            Binding::Parsed(f) => {
                let f = Arc::clone(f);
                Target::Parsed(Box::new(move |arg: &str| f(&mut *model, arg)))
            }
            Binding::Action(f) => {
                let f = Arc::clone(f);
                Target::Action(Box::new(move || f(&mut *model)))
            }
            Binding::Callback(f) => {
                let f = Arc::clone(f);
                Target::Callback(Box::new(move |arg: &str| f(&mut *model, arg)))
            }
        }
    }
}

pub type TargetFn<'a> = Box<dyn FnMut(&str) -> Result<(), HandlerError> + 'a>;

/// A borrowed, type-erased slot of one model instance.
pub enum Target<'a> {
    Flag(&'a mut bool),
    Text(&'a mut String),
    OptionalText(&'a mut Option<String>),
    Integer(&'a mut i64),
    List(&'a mut Vec<String>),
    Map(&'a mut BTreeMap<String, String>),
    Parsed(TargetFn<'a>),
    Action(Box<dyn FnMut() + 'a>),
    Callback(TargetFn<'a>),
}

impl Target<'_> {
    pub fn kind(&self) -> TargetKind {
        match self {
            Target::Flag(_) => TargetKind::Flag,
            Target::Text(_) => TargetKind::Text,
            Target::OptionalText(_) => TargetKind::OptionalText,
            Target::Integer(_) => TargetKind::Integer,
            Target::List(_) => TargetKind::List,
            Target::Map(_) => TargetKind::Map,
            Target::Parsed(_) => TargetKind::Parsed,
            Target::Action(_) => TargetKind::Action,
            Target::Callback(_) => TargetKind::Callback,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Model {
        verbose: bool,
        port: u16,
        level: Option<u8>,
        calls: Vec<String>,
    }

    #[test]
    fn flag_projects_onto_field() {
        let mut m = Model::default();
        let b: Binding<Model> = Binding::Flag(|m: &mut Model| &mut m.verbose);
        if let Target::Flag(v) = b.project(&mut m) {
            *v = true;
        }
        assert!(m.verbose);
    }

    #[test]
    fn parsed_converts_with_from_str() {
        let mut m = Model::default();
        let b = Binding::parsed(|m: &mut Model| &mut m.port);
        assert_eq!(b.kind(), TargetKind::Parsed);
        match b.project(&mut m) {
            Target::Parsed(mut f) => f("8080").unwrap(),
            _ => panic!("expected parsed target"),
        }
        assert_eq!(m.port, 8080);
    }

    #[test]
    fn parsed_reports_conversion_failure() {
        let mut m = Model::default();
        let b = Binding::parsed_opt(|m: &mut Model| &mut m.level);
        let err = match b.project(&mut m) {
            Target::Parsed(mut f) => f("loud").unwrap_err(),
            _ => panic!("expected parsed target"),
        };
        assert!(err.0.starts_with("cannot convert 'loud'"));
        assert_eq!(m.level, None);
    }

    #[test]
    fn callback_receives_model_and_argument() {
        let mut m = Model::default();
        let b = Binding::callback(|m: &mut Model, arg: &str| {
            m.calls.push(arg.to_uppercase());
            Ok(())
        });
        if let Target::Callback(mut f) = b.project(&mut m) {
            f("a").unwrap();
            f("b").unwrap();
        }
        assert_eq!(m.calls, vec!["A", "B"]);
    }
}
