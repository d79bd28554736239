//! Function declarations offered to the model.

use gen_common::FunctionKind;
use serde_json::json;

pub const EXECUTE_FUNCTION: &str = "execute-command";
pub const READ_FUNCTION: &str = "read-files";
pub const WRITE_FUNCTION: &str = "write-files";

/// A function the model may call.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

/// Wire name of a function kind.
pub fn function_name(kind: FunctionKind) -> &'static str {
    match kind {
        FunctionKind::Execute => EXECUTE_FUNCTION,
        FunctionKind::Read => READ_FUNCTION,
        FunctionKind::Write => WRITE_FUNCTION,
    }
}

/// Function kind for a wire name, if it is one of ours.
pub fn kind_for_name(name: &str) -> Option<FunctionKind> {
    match name {
        EXECUTE_FUNCTION => Some(FunctionKind::Execute),
        READ_FUNCTION => Some(FunctionKind::Read),
        WRITE_FUNCTION => Some(FunctionKind::Write),
        _ => None,
    }
}

/// The three local functions gen exposes when execution is enabled.
pub fn builtin_tools() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            name: EXECUTE_FUNCTION.to_string(),
            description: execute_description(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "text": {
                        "type": "string",
                        "description": "the complete text of the command to be executed in the shell, for example, to count the files in the current directory 'ls -l | wc -l' may be specified"
                    }
                },
                "required": ["text"]
            }),
        },
        ToolDefinition {
            name: READ_FUNCTION.to_string(),
            description: format!(
                "attaches the content of the files in the user's file system that are listed in the 'filePaths' argument to the next request. \
use this in support of '{EXECUTE_FUNCTION}' as a more efficient alternative to reading file contents with a shell command such as 'cat file'. \
you can also use it to read data you generated yourself, for example by redirecting the output of a command to a temporary file, reading that file with this function and then deleting it"
            ),
            parameters: json!({
                "type": "object",
                "properties": {
                    "filePaths": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "the files to read. each file is specified by its path relative to the current directory"
                    }
                },
                "required": ["filePaths"]
            }),
        },
        ToolDefinition {
            name: WRITE_FUNCTION.to_string(),
            description: format!(
                "writes the supplied content to files in the user's file system, creating any missing directories and replacing existing content. \
use this instead of '{EXECUTE_FUNCTION}' with shell redirection when creating or updating files. either every file is written or, on failure, none are"
            ),
            parameters: json!({
                "type": "object",
                "properties": {
                    "files": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": {
                                "name": { "type": "string", "description": "the path of the file relative to the current directory" },
                                "data": { "type": "string", "description": "the complete content to write to the file" }
                            },
                            "required": ["name", "data"]
                        },
                        "description": "the files to write"
                    }
                },
                "required": ["files"]
            }),
        },
    ]
}

/// Convert a tool definition to the Gemini API format.
pub fn to_gemini_tool(tool: &ToolDefinition) -> serde_json::Value {
    json!({
        "name": tool.name,
        "description": tool.description,
        "parameters": tool.parameters,
    })
}

/// The `tools` entry enabling Google Search grounding.
pub fn google_search_tool() -> serde_json::Value {
    json!({ "googleSearch": {} })
}

/// The `tools` entry declaring every builtin function.
pub fn function_declarations_tool() -> serde_json::Value {
    let declarations: Vec<_> = builtin_tools().iter().map(to_gemini_tool).collect();
    json!({ "functionDeclarations": declarations })
}

fn execute_description() -> String {
    format!(
        "executes a command on the user's machine. it runs as the user and is equivalent to you having access to their terminal. \
use it primarily for local operations such as querying or changing the file system or a local git repo. \
you may also use curl, wget and similar commands if the user has explicitly asked for it or it is implicit in their request, such as a file download or api access. \
when a command spans more than one statement join them with ';' on a single line and never add new lines for formatting. \
to inspect large outputs consider writing them to a temporary file and reading it with '{READ_FUNCTION}', then removing only the temporary files you created. \
a successful command always has a return code of 0, passed in the 'returnCode' field. output, if any, is in 'stdOut'; many commands write nothing to stdout, so an empty 'stdOut' is not a failure. \
an unsuccessful command has a non-zero return code and usually an explanation in 'stdErr'. if the user declined to run the command the return code is 125. \
never repeatedly execute the same command. if you do not get the expected result, stop and summarise your progress and what was wrong with the last result. \
when giving your final response based on a command: if the return code is 0 and there is output, respond with that output only so it can be piped into another command; \
if the return code is 0 and there is no output respond only with 'OK'; otherwise respond only with 'Error' followed by the content of 'stdErr'. \
if the user's instructions require terminating with a particular exit code, the command for that is simply 'exit {{code}}'"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip_through_kinds() {
        for kind in [FunctionKind::Execute, FunctionKind::Read, FunctionKind::Write] {
            assert_eq!(kind_for_name(function_name(kind)), Some(kind));
        }
        assert_eq!(kind_for_name("request-files"), None);
    }

    #[test]
    fn declarations_cover_every_function() {
        let tool = function_declarations_tool();
        let names: Vec<&str> = tool["functionDeclarations"]
            .as_array()
            .unwrap()
            .iter()
            .map(|d| d["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec![EXECUTE_FUNCTION, READ_FUNCTION, WRITE_FUNCTION]);
        assert!(tool["functionDeclarations"][0]["description"]
            .as_str()
            .unwrap()
            .contains("125"));
    }
}
