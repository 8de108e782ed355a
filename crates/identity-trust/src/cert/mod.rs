//! Certificates, certificate paths and certificate construction.

pub mod builder;
pub mod certificate;
pub mod path;

pub use builder::{
    build_cert_path, create_certificate, create_self_signed, decode_public_key, validity_window,
    ValidityWindow,
};
pub use certificate::{CertRole, Certificate};
pub use path::CertPath;
