#![no_main]

use libfuzzer_sys::fuzz_target;
use tripipe_core::{
    disassemble, format_pipeline_row, run_until_drained, CoreConfig, CoreState, Decoder,
    GeneralRegister,
};

fuzz_target!(|data: &[u8]| {
    for pair in data.chunks_exact(2) {
        let word = u16::from_be_bytes([pair[0], pair[1]]);
        assert_eq!(Decoder::decode(word).encode(), word);
        let _ = disassemble(word);
    }

    let Ok(mut state) = CoreState::from_image(data) else {
        return;
    };
    let config = CoreConfig {
        max_cycles: 4096,
        ..CoreConfig::default()
    };
    let _ = run_until_drained(&mut state, &config, |cycle, state| {
        let _ = format_pipeline_row(cycle, state);
    });

    assert_eq!(state.arch.gpr(GeneralRegister::R0), 0);
});
