//! TLS support for lbprobe, using rustls.
//!
//! - [`client`]: connector configuration and probing of peer certificates;
//! - [`cert`]: PEM/DER conversion and certificate subject inspection;
//! - [`http`]: an https client which can present the `host` header as SNI.
//!
//! # lbprobe
//!
//! Crate used by the end-user `lbprobe` crate and the `lbprobe` cli alike.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![cfg_attr(
    not(test),
    warn(clippy::print_stdout, clippy::dbg_macro),
    deny(clippy::unwrap_used, clippy::expect_used)
)]

pub mod cert;
pub mod client;
pub mod http;

mod verify;
#[doc(inline)]
pub use verify::ServerVerifyMode;

pub mod dep {
    //! Dependencies for lbprobe tls modules.
    //!
    //! Exported for your convenience.

    pub mod pki_types {
        //! Re-export of the [`pki-types`] crate.
        //!
        //! [`pki-types`]: https://docs.rs/rustls-pki-types

        #[doc(inline)]
        pub use rustls_pki_types::*;
    }

    pub mod rustls {
        //! Re-export of the [`rustls`] crate.
        //!
        //! [`rustls`]: https://docs.rs/rustls

        #[doc(inline)]
        pub use rustls::*;
    }

    pub mod x509_parser {
        //! Re-export of the [`x509-parser`] crate.
        //!
        //! [`x509-parser`]: https://docs.rs/x509-parser

        #[doc(inline)]
        pub use x509_parser::*;
    }
}
