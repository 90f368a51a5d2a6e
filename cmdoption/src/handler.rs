//! Binding strategies and the registry that resolves them.

use std::sync::Arc;

use tracing::trace;

use crate::binding::{Target, TargetKind};
use crate::error::{BuildError, HandlerError};

/// Applies the arguments consumed for an option to its target.
///
/// `can_handle` is asked once per option at model build time; `apply` runs
/// for every occurrence during a parse.
pub trait Handler: Send + Sync {
    fn name(&self) -> &'static str;

    fn can_handle(&self, kind: TargetKind, arity: usize) -> bool;

    fn apply(&self, target: Target<'_>, args: &[String]) -> Result<(), HandlerError>;
}

fn mismatch(handler: &dyn Handler, target: &Target<'_>, args: &[String]) -> HandlerError {
    HandlerError(format!(
        "{} handler cannot apply {} argument(s) to a {} target",
        handler.name(),
        args.len(),
        target.kind()
    ))
}

/// Sets a boolean to `true`. Takes no argument.
pub struct FlagHandler;

impl Handler for FlagHandler {
    fn name(&self) -> &'static str {
        "flag"
    }

    fn can_handle(&self, kind: TargetKind, arity: usize) -> bool {
        kind == TargetKind::Flag && arity == 0
    }

    fn apply(&self, target: Target<'_>, args: &[String]) -> Result<(), HandlerError> {
        match target {
            Target::Flag(v) if args.is_empty() => {
                *v = true;
                Ok(())
            }
            other => Err(mismatch(self, &other, args)),
        }
    }
}

/// Sets a boolean from one word argument such as `on` or `false`.
///
/// With an empty list of false words, every word that is not a true word
/// evaluates to `false`.
pub struct BooleanHandler {
    true_words: Vec<String>,
    false_words: Vec<String>,
    case_sensitive: bool,
}

impl BooleanHandler {
    pub fn new(true_words: &[&str], false_words: &[&str], case_sensitive: bool) -> Self {
        BooleanHandler {
            true_words: true_words.iter().map(|s| s.to_string()).collect(),
            false_words: false_words.iter().map(|s| s.to_string()).collect(),
            case_sensitive,
        }
    }

    fn matches(&self, word: &str, arg: &str) -> bool {
        if self.case_sensitive {
            word == arg
        } else {
            word.eq_ignore_ascii_case(arg)
        }
    }

    fn decide(&self, arg: &str) -> Option<bool> {
        if self.true_words.iter().any(|w| self.matches(w, arg)) {
            return Some(true);
        }
        if self.false_words.is_empty() || self.false_words.iter().any(|w| self.matches(w, arg)) {
            return Some(false);
        }
        None
    }
}

impl Default for BooleanHandler {
    fn default() -> Self {
        BooleanHandler::new(&["on", "true", "1"], &["off", "false", "0"], false)
    }
}

impl Handler for BooleanHandler {
    fn name(&self) -> &'static str {
        "boolean"
    }

    fn can_handle(&self, kind: TargetKind, arity: usize) -> bool {
        kind == TargetKind::Flag && arity == 1
    }

    fn apply(&self, target: Target<'_>, args: &[String]) -> Result<(), HandlerError> {
        match (target, args) {
            (Target::Flag(v), [arg]) => {
                *v = self.decide(arg).ok_or_else(|| {
                    HandlerError(format!("cannot parse '{}' as boolean", arg))
                })?;
                Ok(())
            }
            (other, args) => Err(mismatch(self, &other, args)),
        }
    }
}

/// Assigns a single argument, converting it for integer and parsed targets.
pub struct ValueHandler;

impl Handler for ValueHandler {
    fn name(&self) -> &'static str {
        "value"
    }

    fn can_handle(&self, kind: TargetKind, arity: usize) -> bool {
        arity == 1
            && matches!(
                kind,
                TargetKind::Text
                    | TargetKind::OptionalText
                    | TargetKind::Integer
                    | TargetKind::Parsed
            )
    }

    fn apply(&self, target: Target<'_>, args: &[String]) -> Result<(), HandlerError> {
        match (target, args) {
            (Target::Text(v), [arg]) => {
                *v = arg.clone();
                Ok(())
            }
            (Target::OptionalText(v), [arg]) => {
                *v = Some(arg.clone());
                Ok(())
            }
            (Target::Integer(v), [arg]) => {
                *v = arg
                    .parse()
                    .map_err(|_| HandlerError(format!("'{}' is not an integer", arg)))?;
                Ok(())
            }
            (Target::Parsed(mut f), [arg]) => f(arg.as_str()),
            (other, args) => Err(mismatch(self, &other, args)),
        }
    }
}

/// Appends every argument of every occurrence to a list, keeping order and
/// duplicates.
pub struct AccumulateHandler;

impl Handler for AccumulateHandler {
    fn name(&self) -> &'static str {
        "accumulate"
    }

    fn can_handle(&self, kind: TargetKind, arity: usize) -> bool {
        kind == TargetKind::List && arity >= 1
    }

    fn apply(&self, target: Target<'_>, args: &[String]) -> Result<(), HandlerError> {
        match target {
            Target::List(list) if !args.is_empty() => {
                list.extend(args.iter().cloned());
                Ok(())
            }
            other => Err(mismatch(self, &other, args)),
        }
    }
}

/// Inserts a `KEY VALUE` argument pair into a map. A repeated key keeps the
/// last value.
pub struct MapHandler;

impl Handler for MapHandler {
    fn name(&self) -> &'static str {
        "map"
    }

    fn can_handle(&self, kind: TargetKind, arity: usize) -> bool {
        kind == TargetKind::Map && arity == 2
    }

    fn apply(&self, target: Target<'_>, args: &[String]) -> Result<(), HandlerError> {
        match (target, args) {
            (Target::Map(map), [key, value]) => {
                map.insert(key.clone(), value.clone());
                Ok(())
            }
            (other, args) => Err(mismatch(self, &other, args)),
        }
    }
}

/// Invokes a zero- or one-argument callback on the model.
pub struct CallbackHandler;

impl Handler for CallbackHandler {
    fn name(&self) -> &'static str {
        "callback"
    }

    fn can_handle(&self, kind: TargetKind, arity: usize) -> bool {
        matches!(
            (kind, arity),
            (TargetKind::Action, 0) | (TargetKind::Callback, 1)
        )
    }

    fn apply(&self, target: Target<'_>, args: &[String]) -> Result<(), HandlerError> {
        match (target, args) {
            (Target::Action(mut f), []) => {
                f();
                Ok(())
            }
            (Target::Callback(mut f), [arg]) => f(arg.as_str()),
            (other, args) => Err(mismatch(self, &other, args)),
        }
    }
}

/// Ordered set of handlers consulted when an option declares none.
#[derive(Clone)]
pub struct HandlerRegistry {
    handlers: Vec<Arc<dyn Handler>>,
}

impl HandlerRegistry {
    /// A registry without any handler, not even the built-in ones.
    pub fn empty() -> Self {
        HandlerRegistry {
            handlers: Vec::new(),
        }
    }

    /// Add a handler. Handlers registered later are consulted first.
    pub fn register<H: Handler + 'static>(&mut self, handler: H) {
        self.handlers.push(Arc::new(handler));
    }

    pub fn register_shared(&mut self, handler: Arc<dyn Handler>) {
        self.handlers.push(handler);
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Pick the handler for an option bound to `kind` with `arity` arguments.
    ///
    /// An explicit handler is returned as is; otherwise the newest
    /// registration accepting `(kind, arity)` wins.
    pub fn resolve(
        &self,
        option: &str,
        kind: TargetKind,
        arity: usize,
        explicit: Option<&Arc<dyn Handler>>,
    ) -> Result<Arc<dyn Handler>, BuildError> {
        if let Some(h) = explicit {
            trace!(option, handler = h.name(), "explicit handler");
            return Ok(Arc::clone(h));
        }
        self.handlers
            .iter()
            .rev()
            .find(|h| h.can_handle(kind, arity))
            .cloned()
            .ok_or_else(|| BuildError::NoHandlerFound {
                option: option.to_string(),
                kind: kind.name(),
                arity,
            })
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        let mut registry = HandlerRegistry::empty();
        registry.register(FlagHandler);
        registry.register(BooleanHandler::default());
        registry.register(ValueHandler);
        registry.register(AccumulateHandler);
        registry.register(MapHandler);
        registry.register(CallbackHandler);
        registry
    }
}
