pub mod ports;
pub mod upload_use_case;
pub mod number_use_case;
pub mod group_use_case;
pub mod unmatched_use_case;
pub mod template_use_case;
pub mod media_use_case;

#[cfg(test)]
pub(crate) mod test_support;
