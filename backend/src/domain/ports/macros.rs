//! Helper macro for declaring port error enums.
//!
//! Each variant gets a snake_case constructor; `String` fields accept anything
//! `Into<String>` so adapters can pass `&str` or formatted messages directly.

macro_rules! define_port_error {
    (@ctor $variant:ident) => {
        ::paste::paste! {
            #[doc = concat!("Build [`Self::", stringify!($variant), "`].")]
            pub fn [<$variant:snake>]() -> Self {
                Self::$variant
            }
        }
    };

    (@ctor $variant:ident { $($field:ident : $ty:ty),* $(,)? }) => {
        define_port_error!(@ctor_fields $variant () () $( $field : $ty, )*);
    };

    (@ctor_fields $variant:ident ($($params:tt)*) ($($inits:tt)*) ) => {
        ::paste::paste! {
            #[doc = concat!("Build [`Self::", stringify!($variant), "`].")]
            pub fn [<$variant:snake>]($($params)*) -> Self {
                Self::$variant { $($inits)* }
            }
        }
    };

    (@ctor_fields $variant:ident ($($params:tt)*) ($($inits:tt)*) $field:ident : $ty:ty, $($rest:tt)*) => {
        define_port_error!(
            @ctor_fields
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
    define_port_error! {
        pub enum SampleGatewayError {
            Unconfigured => "gateway is not configured",
            Rejected { status: u16, message: String } => "gateway rejected request ({status}): {message}",
            Transport { message: String } => "gateway unreachable: {message}",
        }
    }

    #[test]
    fn unit_variants_get_nullary_constructors() {
        assert_eq!(
            SampleGatewayError::unconfigured().to_string(),
            "gateway is not configured"
        );
    }

    #[test]
    fn string_fields_accept_str() {
        let err = SampleGatewayError::transport("timed out");
        assert_eq!(err, SampleGatewayError::Transport { message: "timed out".into() });
    }

    #[test]
    fn mixed_fields_keep_their_types() {
        let err = SampleGatewayError::rejected(401_u16, "bad key");
        assert_eq!(err.to_string(), "gateway rejected request (401): bad key");
    }
}
