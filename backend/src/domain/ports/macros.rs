//! Macro generating `thiserror` port error enums with snake_case constructors.

macro_rules! define_port_error {
    (@ctor $variant:ident) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]() -> Self {
                Self::$variant
            }
        }
    };

    (@ctor $variant:ident { $($field:ident : $ty:ty),* $(,)? }) => {
        define_port_error!(@ctor_impl $variant () () $( $field : $ty, )*);
    };

    (@ctor_impl $variant:ident ($($params:tt)*) ($($inits:tt)*) ) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]($($params)*) -> Self {
                Self::$variant { $($inits)* }
            }
        }
    };

    (@ctor_impl $variant:ident ($($params:tt)*) ($($inits:tt)*) $field:ident : $ty:ty, $($rest:tt)*) => {
        define_port_error!(
            @ctor_impl
            $variant
            ($($params)* $field: impl Into<$ty>,)
            ($($inits)* $field: $field.into(),)
            $($rest)*
        );
    };
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
                define_port_error!(@ctor $variant $( { $($field : $ty),* } )?);
            )*
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    define_port_error! {
        pub enum SampleSinkError {
            Closed => "sink closed",
            Write { message: String } => "write failed: {message}",
            Partial { written: usize } => "partial write: {written} bytes",
            Rejected { message: String, line: usize } => "rejected line {line}: {message}",
        }
    }

    #[test]
    fn unit_variants_get_constructors() {
        assert_eq!(SampleSinkError::closed().to_string(), "sink closed");
    }

    #[test]
    fn constructors_accept_str_for_string_fields() {
        let err = SampleSinkError::write("disk full");
        assert_eq!(err.to_string(), "write failed: disk full");
    }

    #[test]
    fn constructors_preserve_non_string_types() {
        let err = SampleSinkError::partial(12_usize);
        assert_eq!(err.to_string(), "partial write: 12 bytes");
    }

    #[test]
    fn constructors_support_mixed_fields() {
        let err = SampleSinkError::rejected("newline", 3_usize);
        assert_eq!(err.to_string(), "rejected line 3: newline");
    }
}
