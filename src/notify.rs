// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::cell::RefCell;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Variant {
    Default,
    Warning,
    Destructive,
}

/// Transient user-facing message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Toast {
    pub title: String,
    pub description: String,
    pub variant: Variant,
}

impl Toast {
    pub fn success(description: impl Into<String>) -> Self {
        Self::new("Success", description, Variant::Default)
    }

    pub fn error(description: impl Into<String>) -> Self {
        Self::new("Error", description, Variant::Destructive)
    }

    pub fn new(title: impl Into<String>, description: impl Into<String>, variant: Variant) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant,
        }
    }
}

pub trait Notifier {
    fn toast(&self, toast: Toast);
}

/// Writes toasts to the terminal: errors to stderr, the rest to stdout.
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn toast(&self, toast: Toast) {
        match toast.variant {
            Variant::Destructive => eprintln!("✖ {}: {}", toast.title, toast.description),
            Variant::Warning => eprintln!("! {}: {}", toast.title, toast.description),
            Variant::Default => println!("✔ {}: {}", toast.title, toast.description),
        }
    }
}

/// Keeps every toast, for callers that render them later.
#[derive(Default)]
pub struct ToastLog {
    toasts: RefCell<Vec<Toast>>,
}

impl ToastLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&self) -> Vec<Toast> {
        self.toasts.take()
    }

    pub fn len(&self) -> usize {
        self.toasts.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.borrow().is_empty()
    }

    pub fn last(&self) -> Option<Toast> {
        self.toasts.borrow().last().cloned()
    }
}

impl Notifier for ToastLog {
    fn toast(&self, toast: Toast) {
        self.toasts.borrow_mut().push(toast);
    }
}
