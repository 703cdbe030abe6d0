//! Helper macro for port error enums.
//!
//! Each generated enum gets snake-case constructors accepting `impl Into<_>`
//! fields and a `From` conversion into the domain [`Error`] carrying the
//! declared [`ErrorCode`].
//!
//! [`Error`]: crate::domain::Error
//! [`ErrorCode`]: crate::domain::ErrorCode

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
        pub enum $name:ident => $code:ident {
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

        impl From<$name> for $crate::domain::Error {
            fn from(error: $name) -> Self {
                $crate::domain::Error::new($crate::domain::ErrorCode::$code, error.to_string())
            }
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    //! Regression coverage for the generated constructors and conversions.
    use crate::domain::{Error, ErrorCode};

    define_port_error! {
        pub enum SamplePortError => RemoteFailure {
            Timeout => "timed out",
            Rejected { status: u16 } => "rejected with status {status}",
            Io { message: String, attempt: u32 } => "io: {message} (attempt {attempt})",
        }
    }

    #[test]
    fn unit_variants_get_snake_case_constructors() {
        assert_eq!(SamplePortError::timeout(), SamplePortError::Timeout);
    }

    #[test]
    fn constructors_accept_into_fields() {
        let err = SamplePortError::io("disk gone", 3_u32);
        assert_eq!(err.to_string(), "io: disk gone (attempt 3)");
    }

    #[test]
    fn conversion_into_domain_error_uses_declared_code() {
        let err: Error = SamplePortError::rejected(503_u16).into();
        assert_eq!(err.code(), ErrorCode::RemoteFailure);
        assert_eq!(err.message(), "rejected with status 503");
    }
}
