//! Prompt text sent to the generation service.

use super::GenerationMode;

const HINT_SYSTEM_PROMPT: &str = "You are a helpful math tutor. Provide a brief, encouraging hint \
to help students solve the problem without giving away the complete solution. Focus on the first \
step or key concept they should consider. Keep it to 1-2 sentences maximum.";

const SOLUTION_SYSTEM_PROMPT: &str = r#"You are an expert math tutor. Provide clear, comprehensive step-by-step solutions to math problems. 

IMPORTANT FORMATTING RULES:
- Use "**Solution:**" as a main heading
- Break down the solution into numbered steps like "Step 1:", "Step 2:", etc.
- Use "**Answer:**" or "**Final Answer:**" for the conclusion
- For ALL mathematical expressions, wrap them in simple dollar signs: $expression$
- Do NOT use \( \) or \[ \] delimiters - only use $...$
- Use standard LaTeX: $\pi$, $\int$, $x^2$, $\frac{a}{b}$, $\sqrt{x}$, $\leq$, $\geq$
- Write mathematical expressions simply and clearly
- If there are multiple choice options, clearly identify which option is correct

Examples of CORRECT formatting:
- Pi: $\pi$ 
- Integrals: $\int_0^1 f(x) dx$
- Fractions: $\frac{\pi}{2}$, $\frac{1}{4}$
- Functions: $y = \frac{1}{2}\sin^2(x^2)$
- Exponents: $x^2$, $[f(y)]^2$
- Bounds: $0 \leq x \leq \sqrt{\pi}$
- Volume: $V = \pi \int_a^b [f(y)]^2 dy$

Make sure ALL mathematical content uses ONLY $...$ delimiters, no other LaTeX delimiters."#;

pub fn system_prompt(mode: GenerationMode) -> &'static str {
    match mode {
        GenerationMode::Hint => HINT_SYSTEM_PROMPT,
        GenerationMode::Solution => SOLUTION_SYSTEM_PROMPT,
    }
}

pub fn user_prompt(mode: GenerationMode, problem: &str) -> String {
    match mode {
        GenerationMode::Hint => format!(
            "Please provide a helpful hint for this math problem (don't solve it completely): {}",
            problem
        ),
        GenerationMode::Solution => format!(
            "Please solve this calculus problem step by step with clear explanations. \
             Use ONLY $...$ for math formatting, no \\( \\) delimiters: {}",
            problem
        ),
    }
}
