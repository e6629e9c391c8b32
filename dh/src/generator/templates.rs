//! Embedded build-file templates
//!
//! These are compiled into the binary and used when no project override
//! exists under `.dockhand/templates/`.

use super::Framework;

/// Node/Express server image
pub const NODE: &str = r#"FROM node:{{runtime_version}}

WORKDIR /app

COPY package*.json ./
RUN npm install

COPY . .
{{#each env_vars}}
ENV {{key}}={{value}}
{{/each}}

EXPOSE {{port}}

CMD ["node", "{{entry_point}}"]
"#;

/// React static build served by nginx
pub const REACT: &str = r#"FROM node:{{runtime_version}} AS build

WORKDIR /app

COPY package*.json ./
RUN npm install

COPY . .
RUN npm run build

FROM nginx:alpine

COPY --from=build /app/build /usr/share/nginx/html

EXPOSE {{port}}

CMD ["nginx", "-g", "daemon off;"]
"#;

/// Angular static build served by nginx
pub const ANGULAR: &str = r#"FROM node:{{runtime_version}} AS build

WORKDIR /app

COPY package*.json ./
RUN npm install

COPY . .
RUN npm run build

FROM nginx:alpine

COPY --from=build /app/dist /usr/share/nginx/html

EXPOSE {{port}}

CMD ["nginx", "-g", "daemon off;"]
"#;

/// Next.js production server
pub const NEXTJS: &str = r#"FROM node:{{runtime_version}}

WORKDIR /app

COPY package*.json ./
RUN npm install

COPY . .
RUN npm run build
{{#each env_vars}}
ENV {{key}}={{value}}
{{/each}}

EXPOSE {{port}}

CMD ["npm", "start"]
"#;

/// Look up the embedded template for a framework
pub fn get_embedded(framework: Framework) -> Option<&'static str> {
    match framework {
        Framework::Node => Some(NODE),
        Framework::React => Some(REACT),
        Framework::Angular => Some(ANGULAR),
        Framework::NextJs => Some(NEXTJS),
        Framework::Unknown => None,
    }
}
