#![no_main]

use db2_engine::{ConnectionDescriptor, DescriptorStrategy, ResolvedDescriptor};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };

    if let Ok(resolved) = ResolvedDescriptor::parse(s) {
        // Rebuilding from any parsed attributes must not panic
        let params = resolved.to_parameters();
        for form in [
            db2_engine::DescriptorForm::AttributeList,
            db2_engine::DescriptorForm::EmbeddedCredentials,
        ] {
            let _ = ConnectionDescriptor::from_url(form.build(&params).into_string());
        }
    }

    let _ = ResolvedDescriptor::parse_attribute_list(s);
});
