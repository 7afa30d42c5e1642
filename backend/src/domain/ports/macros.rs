//! Helper macro for generating store error enums with ergonomic
//! constructors.

/// Define a `thiserror` enum whose struct variants get snake_case
/// constructors accepting `impl Into<FieldType>` arguments.
macro_rules! define_store_error {
    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident { $($field:ident : $ty:ty),* $(,)? } => $message:expr
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant { $($field : $ty),* },
            )*
        }

        impl $name {
            ::paste::paste! {
                $(
                    pub fn [<$variant:snake>]($($field: impl Into<$ty>),*) -> Self {
                        Self::$variant { $($field: $field.into()),* }
                    }
                )*
            }
        }
    };
}

pub(crate) use define_store_error;

#[cfg(test)]
mod tests {
    //! Regression coverage for the macro expansion.
    define_store_error! {
        pub enum ExampleStoreError {
            Missing { message: String } => "missing: {message}",
            Busy { message: String, attempts: u32 } => "busy: {message} ({attempts})",
        }
    }

    #[test]
    fn constructors_accept_str_for_string_fields() {
        let err = ExampleStoreError::missing("no such row");
        assert_eq!(err.to_string(), "missing: no such row");
    }

    #[test]
    fn constructors_support_mixed_fields() {
        let err = ExampleStoreError::busy("lock held", 3_u32);
        assert_eq!(err.to_string(), "busy: lock held (3)");
    }
}
