//! Static token tables for the FASM dialect highlighted in book code blocks

/// Instruction mnemonics recognized by the highlighter. Lowercase; matching
/// is case-insensitive. Glossary keys are the uppercase form of these.
pub static MNEMONICS: &[&str] = &[
    // Data movement
    "mov", "movsx", "movzx", "lea", "xchg", "push", "pop", "pushad", "popad", "pushfd", "popfd",
    "bswap", "cmovz", "cmove", "cmovne", "cmovg", "cmovl", "cmova", "cmovb", "lahf", "sahf",
    // Arithmetic
    "add", "sub", "mul", "imul", "div", "idiv", "inc", "dec", "neg", "adc", "sbb", "cdq", "cwd",
    "cwde", "cbw",
    // Logic and bits
    "and", "or", "xor", "not", "shl", "shr", "sal", "sar", "rol", "ror", "rcl", "rcr", "shld",
    "shrd", "bt", "bts", "btr", "btc", "bsf", "bsr", "test", "cmp",
    "setz", "setnz", "setc", "setnc", "setg", "setl", "seta", "setb",
    // Control flow
    "jmp", "call", "ret", "retn", "je", "jne", "jz", "jnz", "jg", "jge", "jl", "jle", "ja", "jae",
    "jb", "jbe", "jc", "jnc", "jo", "jno", "js", "jns", "jp", "jnp", "jcxz", "jecxz", "loop",
    "loope", "loopne", "loopz", "loopnz", "enter", "leave", "int", "into", "iret", "nop", "hlt",
    // String operations
    "movsb", "movsw", "movsd", "cmpsb", "cmpsw", "cmpsd", "scasb", "scasw", "scasd", "stosb",
    "stosw", "stosd", "lodsb", "lodsw", "lodsd", "rep", "repe", "repne", "repz", "repnz",
    // Flags
    "clc", "stc", "cmc", "cld", "std", "cli", "sti", "pushf", "popf",
    // Misc
    "xlat", "xlatb", "cpuid", "rdtsc",
];

/// Register names, all sizes plus segment/FPU/SSE forms.
pub static REGISTERS: &[&str] = &[
    "eax", "ebx", "ecx", "edx", "esi", "edi", "esp", "ebp", "eip",
    "ax", "bx", "cx", "dx", "si", "di", "sp", "bp",
    "al", "ah", "bl", "bh", "cl", "ch", "dl", "dh",
    "cs", "ds", "ss", "es", "fs", "gs",
    "st0", "st1", "st2", "st3", "st4", "st5", "st6", "st7",
    "xmm0", "xmm1", "xmm2", "xmm3", "xmm4", "xmm5", "xmm6", "xmm7",
    "rax", "rbx", "rcx", "rdx", "rsi", "rdi", "rsp", "rbp",
    "r8", "r9", "r10", "r11", "r12", "r13", "r14", "r15",
];

/// FASM assembler directives and data-definition keywords.
pub static DIRECTIVES: &[&str] = &[
    "format", "entry", "org", "use16", "use32", "use64", "include", "section", "segment",
    "db", "dw", "dd", "dq", "dt", "rb", "rw", "rd", "rq", "dup",
    "equ", "label", "virtual", "align", "times", "display", "err",
    "macro", "purge", "struc", "rept", "repeat", "while", "if", "else", "end",
    "proc", "endp", "local", "invoke", "stdcall", "ccall", "public", "extrn",
    "byte", "word", "dword", "qword", "ptr",
];

/// Fence language tags treated as assembly and routed through the highlighter.
pub static ASSEMBLY_ALIASES: &[&str] = &["assembly", "asm", "fasm", "x86", "nasm"];

pub fn is_mnemonic(word: &str) -> bool {
    let lower = word.to_ascii_lowercase();
    MNEMONICS.contains(&lower.as_str())
}

pub fn is_register(word: &str) -> bool {
    let lower = word.to_ascii_lowercase();
    REGISTERS.contains(&lower.as_str())
}

pub fn is_directive(word: &str) -> bool {
    let lower = word.to_ascii_lowercase();
    DIRECTIVES.contains(&lower.as_str())
}

/// True when a fenced block's language tag should get assembly highlighting.
pub fn is_assembly_language(tag: &str) -> bool {
    let lower = tag.trim().to_ascii_lowercase();
    ASSEMBLY_ALIASES.contains(&lower.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mnemonic_case_insensitive() {
        assert!(is_mnemonic("mov"));
        assert!(is_mnemonic("MOV"));
        assert!(is_mnemonic("Jnz"));
        assert!(!is_mnemonic("xyzzy"));
    }

    #[test]
    fn test_assembly_aliases() {
        assert!(is_assembly_language("assembly"));
        assert!(is_assembly_language("FASM"));
        assert!(is_assembly_language(" asm "));
        assert!(!is_assembly_language("python"));
    }

    #[test]
    fn test_register_and_directive() {
        assert!(is_register("eax"));
        assert!(is_register("XMM0"));
        assert!(is_directive("org"));
        assert!(!is_directive("eax"));
    }
}
