//! Helper macro for declaring adapter error enums with snake-case constructors.
//!
//! `define_port_error!` derives `thiserror::Error`, attaches the display
//! message to each variant, and generates one constructor per variant whose
//! field arguments accept anything convertible into the field type.

macro_rules! define_port_error {
    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $( { $($field:ident : $ty:ty),* $(,)? } )? => $message:expr
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant $( { $($field : $ty),* } )?,
            )*
        }

        impl $name {
            $(
                define_port_error!(@constructor $variant $( { $($field : $ty),* } )?);
            )*
        }
    };

    (@constructor $variant:ident) => {
        ::paste::paste! {
            #[doc = "Build [`Self::" $variant "`]."]
            pub fn [<$variant:snake>]() -> Self {
                Self::$variant
            }
        }
    };

    (@constructor $variant:ident { $($field:ident : $ty:ty),* }) => {
        ::paste::paste! {
            #[doc = "Build [`Self::" $variant "`], converting each field."]
            pub fn [<$variant:snake>]($($field: impl Into<$ty>),*) -> Self {
                Self::$variant { $($field: $field.into()),* }
            }
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    define_port_error! {
        pub enum ExampleTransportError {
            Unreachable => "transport unreachable",
            Command { message: String } => "command failed: {message}",
            Throttled { retry_after: u32 } => "throttled for {retry_after}s",
            Partial { message: String, written: u32 } => "partial write: {message} ({written})",
        }
    }

    #[test]
    fn unit_variants_get_plain_constructors() {
        assert_eq!(
            ExampleTransportError::unreachable().to_string(),
            "transport unreachable"
        );
    }

    #[test]
    fn constructors_accept_str_for_string_fields() {
        let err = ExampleTransportError::command("SET rejected");
        assert_eq!(err.to_string(), "command failed: SET rejected");
    }

    #[test]
    fn constructors_preserve_non_string_types() {
        let err = ExampleTransportError::throttled(3_u32);
        assert_eq!(err.to_string(), "throttled for 3s");
    }

    #[test]
    fn constructors_support_mixed_fields() {
        let err = ExampleTransportError::partial("socket closed", 2_u32);
        assert_eq!(err.to_string(), "partial write: socket closed (2)");
    }
}
