//! Shell completion candidates for commands that take a key name
//!
//! The static clap_complete scripts know the commands and flags but not the
//! stored keys. `key_hook` returns a snippet to append to that script which
//! wraps its completion function and asks `<bin> complete <cmd> <args...>`
//! for key names.

use clap_complete::Shell;

/// Commands whose positional argument is an existing key
pub const KEY_COMMANDS: &[&str] = &["get", "delete"];

/// Select the key names to offer for `command` given the arguments typed so far
///
/// Once any typed argument names a known key the slot is filled and nothing
/// is offered.
pub fn candidates(command: &str, known: &[String], typed: &[String]) -> Vec<String> {
    if !KEY_COMMANDS.contains(&command) {
        return Vec::new();
    }
    if known.iter().any(|key| typed.contains(key)) {
        return Vec::new();
    }

    known.to_vec()
}

const BASH_HOOK: &str = r##"
_{bin}_keys() {
    local cmd="${COMP_WORDS[1]}"
    case "$cmd" in
        get|delete)
            if [[ ${COMP_CWORD} -ge 2 && "${COMP_WORDS[COMP_CWORD]}" != -* ]]; then
                local keys
                keys="$({bin} complete "$cmd" "${COMP_WORDS[@]:2:COMP_CWORD-2}" 2>/dev/null)"
                COMPREPLY=( $(compgen -W "$keys" -- "${COMP_WORDS[COMP_CWORD]}") )
                return 0
            fi
            ;;
    esac
    _{bin} "$@"
}
complete -F _{bin}_keys -o bashdefault -o default {bin}
"##;

const ZSH_HOOK: &str = r##"
_{bin}_keys() {
    if (( CURRENT >= 3 )) && [[ ${words[2]} == (get|delete) && ${words[CURRENT]} != -* ]]; then
        local -a keys
        keys=(${(f)"$({bin} complete ${words[2]} ${words[3,CURRENT-1]} 2>/dev/null)"})
        compadd -a keys
        return 0
    fi
    _{bin} "$@"
}
compdef _{bin}_keys {bin}
"##;

const FISH_HOOK: &str = r##"
complete -c {bin} -n "__fish_seen_subcommand_from get delete" -f -a "({bin} complete (commandline -opc)[2..-1] 2>/dev/null)"
"##;

/// Snippet that feeds key names into the completion script for `shell`
///
/// Returns `None` for shells without a hook; their script only completes
/// commands and flags.
pub fn key_hook(shell: Shell, bin: &str) -> Option<String> {
    let template = match shell {
        Shell::Bash => BASH_HOOK,
        Shell::Zsh => ZSH_HOOK,
        Shell::Fish => FISH_HOOK,
        _ => return None,
    };
    Some(template.replace("{bin}", bin))
}
