macro_rules! slot_fromint {
    ($imp:ty, $max:expr, $($t:ty),*) => {
        $(
            impl std::convert::TryFrom<$t> for $imp {
                type Error = crate::OutOfRange<$t>;

                fn try_from(val: $t) -> Result<Self, Self::Error> {
                    if (0 as $t .. $max as $t).contains(&val) {
                        Ok(Self(val as u8))
                    } else {
                        Err(crate::OutOfRange(val))
                    }
                }
            }

            impl From<$imp> for $t {
                fn from(val: $imp) -> $t {
                    val.0 as $t
                }
            }
        )*
    };
}
