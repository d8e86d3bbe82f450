/*!
Deferred prompting. A field marked `defer` that got no value from the command
line or its parent isn't prompted for while parsing. It resolves to a
[`DeferredValue`] instead, which asks the prompter the first time it's read,
so a prompt the program never needs is never shown.

Command structs hold such fields as a [`Deferred<T>`].
*/

use core::fmt;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use tracing::debug;

use crate::{
    errors::{DeferredError, MaxAttemptsExceeded, ValueMismatch},
    parameter::ArgType,
    prompt::{PromptRequest, Prompter},
    schema::ArgumentSpec,
    ty::Ty,
    value::Value,
};

struct Pending {
    spec: Arc<ArgumentSpec>,
    prompter: Arc<dyn Prompter>,
    value: Mutex<Option<Value>>,
}

/// An untyped value that will be prompted for when it's first needed. Clones
/// share the same answer, so the prompt happens at most once between them.
#[derive(Clone)]
pub struct DeferredValue {
    pending: Arc<Pending>,
}

impl DeferredValue {
    pub(crate) fn new(spec: Arc<ArgumentSpec>, prompter: Arc<dyn Prompter>) -> Self {
        Self {
            pending: Arc::new(Pending {
                spec,
                prompter,
                value: Mutex::new(None),
            }),
        }
    }

    #[must_use]
    pub fn field(&self) -> &str {
        self.pending.spec.name()
    }

    /// The answer, if the prompt already happened
    #[must_use]
    pub fn peek(&self) -> Option<Value> {
        self.pending
            .value
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Get the value, prompting for it if this is the first time. A prompt
    /// that runs out of attempts leaves the value unresolved, so the next
    /// call asks again.
    pub fn resolve(&self) -> Result<Value, MaxAttemptsExceeded> {
        let mut slot = self
            .pending
            .value
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(value) = &*slot {
            return Ok(value.clone());
        }

        let spec = &self.pending.spec;
        debug!(field = spec.name(), "resolving deferred value");

        let text = spec.prompt().unwrap_or(spec.name());
        let default = spec.default().get();
        let value = self
            .pending
            .prompter
            .prompt(&PromptRequest::for_field(spec, text, default.as_ref()))?;

        *slot = Some(value.clone());
        Ok(value)
    }
}

impl PartialEq for DeferredValue {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.pending, &other.pending)
    }
}

impl fmt::Debug for DeferredValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeferredValue")
            .field("field", &self.field())
            .field("value", &self.peek())
            .finish()
    }
}

#[derive(Clone)]
enum State<T> {
    Ready(T),
    Pending {
        value: OnceLock<T>,
        source: DeferredValue,
    },
}

/**
The type of a `#[parley(defer)]` field. If the value was given on the command
line it's available right away; otherwise [`get`][Deferred::get] prompts for it
the first time it's called.

```
# use parley::{Command, Deferred};
/// Tracks your running
#[derive(Command, Debug)]
struct Runner {
    #[parley(prompt = "How many days a week do you run?", defer)]
    often: Deferred<u8>,
}
```
*/
#[derive(Clone)]
pub struct Deferred<T> {
    state: State<T>,
}

impl<T: ArgType> Deferred<T> {
    /// A value that's already known, so no prompt is needed
    pub fn ready(value: T) -> Self {
        Self {
            state: State::Ready(value),
        }
    }

    /// True if reading the value won't prompt
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        match &self.state {
            State::Ready(_) => true,
            State::Pending { value, source } => value.get().is_some() || source.peek().is_some(),
        }
    }

    /// Get the value, prompting for it if it hasn't been asked for yet
    pub fn get(&self) -> Result<&T, DeferredError> {
        match &self.state {
            State::Ready(value) => Ok(value),
            State::Pending { value, source } => {
                if let Some(value) = value.get() {
                    return Ok(value);
                }

                let typed = T::from_value(source.resolve()?)?;
                Ok(value.get_or_init(|| typed))
            }
        }
    }

    /// Take the value, prompting for it if it hasn't been asked for yet
    pub fn into_inner(self) -> Result<T, DeferredError> {
        match self.state {
            State::Ready(value) => Ok(value),
            State::Pending { value, source } => match value.into_inner() {
                Some(value) => Ok(value),
                None => Ok(T::from_value(source.resolve()?)?),
            },
        }
    }
}

impl<T: ArgType + Default> Default for Deferred<T> {
    fn default() -> Self {
        Self::ready(T::default())
    }
}

impl<T: ArgType> ArgType for Deferred<T> {
    fn descriptor() -> Ty {
        T::descriptor()
    }

    fn from_value(value: Value) -> Result<Self, ValueMismatch> {
        match value {
            Value::Deferred(source) => Ok(Self {
                state: State::Pending {
                    value: OnceLock::new(),
                    source,
                },
            }),
            value => T::from_value(value).map(Self::ready),
        }
    }

    fn into_value(self) -> Value {
        match self.state {
            State::Ready(value) => value.into_value(),
            State::Pending { value, source } => match value.into_inner() {
                Some(value) => value.into_value(),
                None => Value::Deferred(source),
            },
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Deferred<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let known = match &self.state {
            State::Ready(value) => Some(value),
            State::Pending { value, .. } => value.get(),
        };

        match known {
            Some(value) => f.debug_tuple("Deferred").field(value).finish(),
            None => f.write_str("Deferred(<pending>)"),
        }
    }
}
