//! Marketing routes that get a pre-rendered shell with crawler-visible copy.

pub struct MarketingRoute {
    pub path: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub heading: &'static str,
    pub paragraphs: &'static [&'static str],
}

pub const MARKETING_ROUTES: &[MarketingRoute] = &[
    MarketingRoute {
        path: "/",
        title: "Business Automation & AI Consulting",
        description: "We design, build and run automation that removes busywork from operations, sales and finance teams.",
        heading: "Automation that pays for itself",
        paragraphs: &[
            "We help growing companies replace manual, repetitive work with reliable automated workflows.",
            "From discovery workshops to production rollouts, our team owns the whole journey.",
        ],
    },
    MarketingRoute {
        path: "/services",
        title: "Services",
        description: "AI automation, workflow integration and data analytics services for operations-heavy teams.",
        heading: "Our services",
        paragraphs: &[
            "AI automation, workflow integration and analytics, delivered as fixed-scope projects or ongoing partnerships.",
        ],
    },
    MarketingRoute {
        path: "/services/ai-automation",
        title: "AI Automation",
        description: "Put language models and document understanding to work on intake, triage and reporting.",
        heading: "AI automation",
        paragraphs: &[
            "Classify requests, extract data from documents and draft responses with human review built in.",
        ],
    },
    MarketingRoute {
        path: "/services/workflow-integration",
        title: "Workflow Integration",
        description: "Connect your CRM, ERP and support tools so data moves without copy and paste.",
        heading: "Workflow integration",
        paragraphs: &[
            "We connect the tools you already pay for and keep the integrations monitored and documented.",
        ],
    },
    MarketingRoute {
        path: "/services/data-analytics",
        title: "Data Analytics",
        description: "Dashboards and reporting pipelines that answer the questions leadership actually asks.",
        heading: "Data analytics",
        paragraphs: &[
            "Clean pipelines, trustworthy metrics and dashboards your team will keep using.",
        ],
    },
    MarketingRoute {
        path: "/about",
        title: "About Us",
        description: "A senior team of engineers and operators focused on practical automation.",
        heading: "About us",
        paragraphs: &[
            "We started as operators who were tired of spreadsheets and became the team we wished we could hire.",
        ],
    },
    MarketingRoute {
        path: "/team",
        title: "Our Team",
        description: "Meet the consultants, engineers and analysts behind every engagement.",
        heading: "Our team",
        paragraphs: &[
            "Every project is staffed with senior people who stay with it from kickoff to handover.",
        ],
    },
    MarketingRoute {
        path: "/contact",
        title: "Contact",
        description: "Book a free consultation and get a written automation assessment within a week.",
        heading: "Talk to us",
        paragraphs: &[
            "Tell us about the process that slows you down and we will reply within one business day.",
        ],
    },
    MarketingRoute {
        path: "/blog",
        title: "Blog",
        description: "Guides, case studies and playbooks on automation, AI and operations.",
        heading: "Insights and guides",
        paragraphs: &[
            "Practical articles on automating operations, written by the people doing the work.",
        ],
    },
];

impl MarketingRoute {
    /// Output file relative to the build directory.
    pub fn output_path(&self) -> String {
        let trimmed = self.path.trim_matches('/');
        if trimmed.is_empty() {
            "index.html".to_string()
        } else {
            format!("{trimmed}/index.html")
        }
    }
}
